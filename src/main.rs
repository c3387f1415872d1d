use clap::Parser;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};
use typeahead::cli::{Cli, Command, parse_command};
use typeahead::events::ALL_EVENTS;
use typeahead::tracing::LogFormat;
use typeahead::{SearchEvent, Typeahead};

/// One-line label for a record.
fn label(record: &Value) -> String {
    ["name", "title", "label", "full_name"]
        .iter()
        .find_map(|key| record.get(key).and_then(Value::as_str))
        .map_or_else(|| record.to_string(), str::to_string)
}

fn render(event: &SearchEvent<Value>) {
    match event {
        SearchEvent::LoadingChanged(true) => println!("… loading"),
        SearchEvent::LoadingChanged(false) => {}
        SearchEvent::ResultsChanged(hits) if hits.is_empty() => println!("(no results)"),
        SearchEvent::ResultsChanged(hits) => {
            for (i, hit) in hits.iter().enumerate() {
                println!("  {:>2}. {}", i, label(&hit.record));
            }
        }
        SearchEvent::HighlightChanged { index, record, .. } => {
            println!("> {:>2}. {}", index, label(record));
        }
        SearchEvent::SelectionMade(record) => println!("selected: {}", record),
        SearchEvent::Commit => println!("commit"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let format = if cli.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    typeahead::tracing::init(format, level);

    let config = cli.search_config()?;
    if config.endpoint.is_none() {
        anyhow::bail!("No endpoint configured. Pass --endpoint or set it in the config file.");
    }

    let widget: Typeahead<Value> = Typeahead::with_http(config);
    let (mut events, _) = widget.events().channel(&ALL_EVENTS);
    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            render(&event);
        }
    });

    if let Some(placeholder) = &widget.config().placeholder {
        println!("{}", placeholder);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_command(&line) {
            Ok(Command::Input(input)) => widget.handle(input),
            Ok(Command::ClearResults) => widget.clear_results(),
            Ok(Command::Forget(query)) => widget.remove_from_cache(&query),
            Ok(Command::ForgetAll) => widget.remove_all_from_cache(),
            Ok(Command::Quit) => break,
            Err(message) => eprintln!("{}", message),
        }
    }

    drop(widget);
    printer.abort();
    Ok(())
}
