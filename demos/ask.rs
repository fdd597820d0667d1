fn help() {
    const HELP: &str = r#"
        TIN_CHAT_URL=http://localhost:5000/chat \
        cargo run --features env-helper --example ask -- tin-report.csv "Which distribution is fastest?"
    "#;
    println!("{HELP}");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let mut args = std::env::args();
    // drop exec
    let _ = args.next();
    let Some(report) = args.next() else {
        help();
        return Ok(());
    };
    let question: Vec<String> = args.collect();

    let text = tokio::fs::read_to_string(&report).await?;

    let mut session = tin_metrics::Session::new();
    session.load(&text);

    for metric in tin_metrics::Metric::ALL {
        session.select_metric(metric);
        println!("{}", session.leaderboard());
    }

    if question.is_empty() {
        return Ok(());
    }

    let relay = tin_metrics::env_helper::relay()?;
    session.ask(&relay, &question.join(" ")).await?;

    for turn in session.conversation() {
        println!("{:?}: {}", turn.role, turn.content);
    }

    Ok(())
}
