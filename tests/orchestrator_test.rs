use std::sync::Arc;

use dealflow::completer::mock::MockCompleter;
use dealflow::config::Settings;
use dealflow::events::{Event, EventBus, Phase};
use dealflow::fetcher::mock::StaticFetcher;
use dealflow::orchestrator::Orchestrator;
use dealflow::pipeline::presets::{self, COMPETITOR_ANALYSIS, RISK_EVALUATOR};
use dealflow::pipeline::{PipelineStep, Registry};
use dealflow::store::StoredRecord;

fn build(
    registry: Registry,
    completer: &Arc<MockCompleter>,
    fetcher: &Arc<StaticFetcher>,
    settings: &Settings,
) -> Orchestrator {
    Orchestrator::new(registry, completer.clone(), fetcher.clone(), settings)
}

#[tokio::test]
async fn every_step_runs_once_in_order() {
    let completer = Arc::new(MockCompleter::numbered(5));
    let fetcher = Arc::new(StaticFetcher::new("Hello World"));
    let registry = presets::investment().unwrap();
    let names: Vec<String> = registry.names().into_iter().map(String::from).collect();
    let mut orch = build(registry, &completer, &fetcher, &Settings::default());

    let run = orch.run("http://example.com", None).await.unwrap();

    assert_eq!(fetcher.urls(), vec!["http://example.com"]);
    assert_eq!(completer.calls(), 5);
    assert_eq!(run.content, "Hello World");
    assert!(run.failures.is_empty());

    let ran: Vec<_> = run.outputs.iter().map(|o| o.step.clone()).collect();
    assert_eq!(ran, names);
    let texts: Vec<_> = run.outputs.iter().map(|o| o.text.as_str()).collect();
    assert_eq!(texts, vec!["reply 1", "reply 2", "reply 3", "reply 4", "reply 5"]);

    // Without chaining every step sees the page, not a predecessor.
    for prompt in completer.prompts() {
        assert!(prompt.contains("Hello World"));
        assert!(!prompt.contains("reply"));
    }
}

#[tokio::test]
async fn chained_steps_see_previous_output() {
    let completer = Arc::new(MockCompleter::numbered(5));
    let fetcher = Arc::new(StaticFetcher::new("Hello World"));
    let settings = Settings {
        chain_outputs: true,
        ..Settings::default()
    };
    let mut orch = build(presets::investment().unwrap(), &completer, &fetcher, &settings);

    orch.run("http://example.com", None).await.unwrap();

    let prompts = completer.prompts();
    assert!(prompts[0].contains("Hello World"));
    for (i, prompt) in prompts.iter().enumerate().skip(1) {
        assert!(prompt.contains(&format!("reply {i}")), "prompt {i}: {prompt}");
        assert!(!prompt.contains("Hello World"));
    }
}

#[tokio::test]
async fn failing_step_does_not_stop_the_run() {
    let completer = Arc::new(MockCompleter::new(vec![
        Ok("fx is stable".into()),
        Ok("sector grows".into()),
        Ok("Acme".into()),
        Err("rate limited".into()),
        Ok("IPO".into()),
    ]));
    let fetcher = Arc::new(StaticFetcher::new("Hello World"));
    let bus = EventBus::default();
    let mut rx = bus.subscribe();
    let mut orch =
        build(presets::investment().unwrap(), &completer, &fetcher, &Settings::default())
            .with_events(bus);

    let run = orch.run("http://example.com", None).await.unwrap();

    assert_eq!(run.outputs.len(), 4);
    assert_eq!(run.failures.len(), 1);
    assert_eq!(run.failures[0].step, RISK_EVALUATOR);
    assert!(run.failures[0].error.contains("rate limited"));

    let Some(StoredRecord::Investment(record)) = run.to_record() else {
        panic!("expected an investment record");
    };
    assert_eq!(record.company_name.as_deref(), Some("Acme"));
    assert_eq!(record.risk_assessment, None);
    assert_eq!(record.exit_strategy.as_deref(), Some("IPO"));

    let mut failed = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let Event::StepFailed { step, .. } = event {
            failed.push(step);
        }
    }
    assert_eq!(failed, vec![RISK_EVALUATOR.to_string()]);
}

#[tokio::test]
async fn scrape_error_is_passed_along_as_content() {
    let completer = Arc::new(MockCompleter::numbered(5));
    let fetcher = Arc::new(StaticFetcher::new("Error during scraping: connection refused"));
    let mut orch = build(
        presets::investment().unwrap(),
        &completer,
        &fetcher,
        &Settings::default(),
    );

    let run = orch.run("http://down.example", None).await.unwrap();

    assert_eq!(run.outputs.len(), 5);
    assert!(completer.prompts()[0].contains("Error during scraping: connection refused"));
}

#[tokio::test]
async fn selection_runs_only_that_step() {
    let completer = Arc::new(MockCompleter::numbered(3));
    let fetcher = Arc::new(StaticFetcher::new("Acme sells solar kits in Dakar"));
    let mut orch = build(
        presets::research().unwrap(),
        &completer,
        &fetcher,
        &Settings::default(),
    );

    let run = orch
        .run("http://example.com", Some(COMPETITOR_ANALYSIS))
        .await
        .unwrap();

    assert_eq!(completer.calls(), 1);
    let prompts = completer.prompts();
    let prompt = &prompts[0];
    assert!(prompt.contains(COMPETITOR_ANALYSIS));
    assert!(prompt.contains("Acme sells solar kits in Dakar"));
    assert_eq!(run.output(COMPETITOR_ANALYSIS), Some("reply 1"));
    assert_eq!(run.selected.as_deref(), Some(COMPETITOR_ANALYSIS));
}

#[tokio::test]
async fn unknown_selection_fails_before_fetching() {
    let completer = Arc::new(MockCompleter::numbered(3));
    let fetcher = Arc::new(StaticFetcher::new("Hello World"));
    let mut orch = build(
        presets::research().unwrap(),
        &completer,
        &fetcher,
        &Settings::default(),
    );

    let err = orch
        .run("http://example.com", Some("Weather Agent"))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("Weather Agent"));
    assert!(fetcher.urls().is_empty());
    assert_eq!(completer.calls(), 0);
}

#[tokio::test]
async fn phases_follow_the_steps() {
    let completer = Arc::new(MockCompleter::numbered(2));
    let fetcher = Arc::new(StaticFetcher::new("Hello World"));
    let mut registry = Registry::new();
    registry
        .register(PipelineStep::completion("first", "r", "i", "{input}"))
        .unwrap();
    registry
        .register(PipelineStep::completion("second", "r", "i", "{input}"))
        .unwrap();
    let bus = EventBus::default();
    let mut rx = bus.subscribe();
    let mut orch =
        build(registry, &completer, &fetcher, &Settings::default()).with_events(bus);

    orch.run("http://example.com", None).await.unwrap();

    let mut phases = Vec::new();
    while let Ok(Event::Phase(phase)) = rx.try_recv() {
        phases.push(phase);
    }
    assert_eq!(
        phases,
        vec![
            Phase::Fetching {
                url: "http://example.com".into()
            },
            Phase::Analyzing {
                step: "first".into()
            },
            Phase::Analyzing {
                step: "second".into()
            },
        ]
    );
}

#[tokio::test]
async fn fetch_step_uses_its_input_as_url() {
    let fetcher = Arc::new(StaticFetcher::new("page text"));
    let mut registry = Registry::new();
    registry
        .register(PipelineStep::completion("linker", "r", "i", "{input}"))
        .unwrap();
    registry
        .register(PipelineStep::fetch("follower", "fetch the link"))
        .unwrap();
    let settings = Settings {
        chain_outputs: true,
        ..Settings::default()
    };
    let completer = Arc::new(MockCompleter::new(vec![Ok(" http://next.example ".into())]));
    let mut orch = build(registry, &completer, &fetcher, &settings);

    let run = orch.run("http://start.example", None).await.unwrap();

    assert_eq!(
        fetcher.urls(),
        vec!["http://start.example", "http://next.example"]
    );
    assert_eq!(run.output("follower"), Some("page text"));
}

#[tokio::test]
async fn session_usage_accumulates_across_runs() {
    let completer = Arc::new(MockCompleter::numbered(10));
    let fetcher = Arc::new(StaticFetcher::new("Hello World"));
    let mut orch = build(
        presets::investment().unwrap(),
        &completer,
        &fetcher,
        &Settings::default(),
    );

    orch.run("http://a.example", None).await.unwrap();
    orch.run("http://b.example", None).await.unwrap();

    // The mock reports no usage, so the total stays at zero.
    assert_eq!(orch.session_usage().total(), 0);
    assert_eq!(completer.calls(), 10);
    assert_eq!(fetcher.urls().len(), 2);
}
