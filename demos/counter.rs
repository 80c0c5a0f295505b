//! Counter demo.
//!
//! Run with `cargo run --example counter [config.toml]`.
//! Logs go to `spark-view.log` (set `RUST_LOG=spark_view=debug` for passes).
//!
//! Keys: Tab / Shift+Tab move focus, `+` / `-` change the focused counter,
//! `r` resets it, `q` or Ctrl+C quits.

use std::fs::File;
use std::sync::Mutex;
use std::time::Duration;

use spark_view::prelude::*;
use tracing_subscriber::EnvFilter;

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

/// One labelled counter that reacts to keys while focused.
struct Counter {
    label: &'static str,
}

impl View for Counter {
    fn body(&self, cx: &mut ViewContext<'_>) -> Body {
        let count = cx.state(|| 0i64);
        let handle = count.clone();

        Body::expand(
            Text::new(format!("{:<8} {:>5}", self.label, count.get()))
                .padding_edges(0, 1, 0, 1)
                .on_key(move |event| match event.key.as_str() {
                    "+" | "=" | "ArrowUp" => {
                        handle.update(|n| *n += 1);
                        true
                    }
                    "-" | "ArrowDown" => {
                        handle.update(|n| *n -= 1);
                        true
                    }
                    "r" => {
                        handle.set(0);
                        true
                    }
                    _ => false,
                })
                .border(BorderStyle::Rounded)
                .focusable(),
        )
    }
}

/// Seconds since the view appeared, counted by a background task.
struct Uptime;

impl View for Uptime {
    fn body(&self, cx: &mut ViewContext<'_>) -> Body {
        let seconds = cx.state(|| 0u64);
        let ticks = seconds.clone();
        cx.task(move |ctx| async move {
            while ctx.sleep(Duration::from_secs(1)).await {
                ticks.update(|s| *s += 1);
            }
        });
        Body::expand(Text::new(format!("up {}s", seconds.get())).dim())
    }
}

struct App;

impl View for App {
    fn body(&self, cx: &mut ViewContext<'_>) -> Body {
        let scheduler = cx.scheduler().clone();
        cx.on_global_key(move |event| {
            if event.key == "q" {
                scheduler.quit();
                true
            } else {
                false
            }
        });

        Body::expand(
            VStack::new()
                .child(
                    HStack::new()
                        .child(Text::new("spark-view counters").bold())
                        .child(Spacer::new())
                        .child(Animated::with_default_interval(|frame| {
                            Text::new(SPINNER[(frame % SPINNER.len() as u64) as usize])
                        })),
                )
                .child(ForEach::new(
                    ["apples", "pears", "plums"],
                    |label| label.to_string(),
                    |label| Counter { label },
                ))
                .child(Spacer::new())
                .child(Uptime)
                .spacing(1)
                .padding(1)
                .title("spark-view counter"),
        )
    }
}

fn main() -> spark_view::Result<()> {
    let log = File::create("spark-view.log")?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(log))
        .with_ansi(false)
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => RuntimeConfig::from_path(path)?,
        None => RuntimeConfig::default(),
    };

    let status = Text::new(" Tab focus · +/- change · r reset · q quit").boxed();
    spark_view::run(config, App, Some(status))
}
