//! Masar demo CLI: a terminal chat with the learning-path advisor.
//!
//! Wires config -> store -> completion client -> orchestrator and runs a
//! stdin loop. `خطتي` (or `plan`) prints the user's materialized plans;
//! `خروج` / `exit` quits.

use std::io::{BufRead, Write};
use std::sync::Arc;

use anyhow::Context;
use chrono::{Duration, Utc};

use masar::config::load_config;
use masar::domain::CourseLevel;
use masar::llm::OpenAiCompletionClient;
use masar::plan::PlanMaterializer;
use masar::session::ConversationSession;
use masar::store::{PlanStore, SqliteStore};
use masar::Orchestrator;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "masar=info".into()),
        )
        .init();

    let cfg = load_config(None).context("loading configuration")?;

    let store = Arc::new(match &cfg.store.path {
        Some(path) => SqliteStore::open(path)?,
        None => SqliteStore::open_in_memory()?,
    });
    if store.course_count()? == 0 {
        seed_demo_catalog(&store)?;
        tracing::info!("seeded demo catalog");
    }

    let api_key = cfg.llm.resolve_api_key()?;
    let llm = Arc::new(OpenAiCompletionClient::new(
        cfg.llm.base_url.as_deref(),
        &cfg.llm.model,
        &api_key,
    ));

    let materializer = PlanMaterializer::new(store.clone(), cfg.engine.default_weekly_hours);
    let orchestrator = Orchestrator::new(llm, store.clone(), cfg.engine.clone());

    let user_id = "demo-user";
    let mut session = ConversationSession::new(user_id, cfg.engine.max_history_messages);

    println!("مرحبا بك في مسار. اكتب رسالتك (خروج للإنهاء، خطتي لعرض الخطة):");
    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if matches!(input, "خروج" | "exit" | "quit") {
            break;
        }
        if matches!(input, "خطتي" | "plan") {
            print_plans(&*store, &materializer, user_id)?;
            continue;
        }

        let outcome = orchestrator.handle_turn(&mut session, input).await;
        println!("{}", outcome.reply);
        if !outcome.suggestions.is_empty() {
            println!("[{}]", outcome.suggestions.join(" | "));
        }
    }
    Ok(())
}

fn print_plans(
    store: &SqliteStore,
    materializer: &PlanMaterializer,
    user_id: &str,
) -> anyhow::Result<()> {
    let plans = store.plans_for(user_id)?;
    if plans.is_empty() {
        println!("لا توجد خطة بعد.");
        return Ok(());
    }
    for stored in &plans {
        let plan = materializer.materialize(stored)?;
        println!(
            "\n== {} ({} | {} ساعة | {:.1} ساعة أسبوعيا) ==",
            plan.title, plan.duration, plan.total_hours, plan.weekly_hours
        );
        for milestone in &plan.milestones {
            println!("-- {}", milestone.title);
            if milestone.courses.is_empty() {
                println!("   (لا توجد دورات بعد)");
            }
            for c in &milestone.courses {
                println!(
                    "   {} [{}h] الأسابيع {}-{}",
                    c.title, c.total_hours, c.start_week, c.end_week
                );
            }
        }
    }
    Ok(())
}

/// A small Arabic web-development catalog so the demo works out of the box.
fn seed_demo_catalog(store: &SqliteStore) -> anyhow::Result<()> {
    let base = Utc::now() - Duration::days(400);
    let courses = [
        ("c-html", "أساسيات HTML", CourseLevel::Beginner, 8),
        ("c-css", "تنسيق الصفحات مع CSS", CourseLevel::Beginner, 12),
        ("c-js", "JavaScript من الصفر", CourseLevel::Beginner, 20),
        ("c-js2", "JavaScript العملي", CourseLevel::Intermediate, 25),
        ("c-react", "تطبيقات React", CourseLevel::Intermediate, 30),
        ("c-node", "الواجهات الخلفية مع Node", CourseLevel::Advanced, 28),
        ("c-react2", "أنماط React المتقدمة", CourseLevel::Advanced, 18),
    ];
    for (i, (id, title, level, hours)) in courses.iter().enumerate() {
        store.insert_course(
            id,
            title,
            "دورة عربية شاملة",
            None,
            *level,
            Some("cat-web"),
            base + Duration::days(i as i64),
        )?;
        store.insert_lesson(id, &format!("{id}-l1"), (hours * 3600) as i64)?;
    }
    Ok(())
}
