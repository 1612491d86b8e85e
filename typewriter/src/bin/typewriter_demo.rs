// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{sync::Arc, time::Duration};

use clap::Parser;
use r3bl_typewriter::{Script, TerminalElement, TracingConfig, Typewriter,
                      TypewriterOptions, tracing_setup};
use tokio::sync::Notify;
use unicode_segmentation::UnicodeSegmentation;

use crate::clap_config::CLIArgs;

#[tokio::main]
async fn main() -> miette::Result<()> {
    let cli_args = CLIArgs::parse();
    cli_args.ensure_has_work()?;

    // 00: handle logging flag. The typewriter owns stdout, so logs only go to a file.
    if cli_args.global_options.enable_logging {
        tracing_setup::init(TracingConfig::new_file(cli_args.global_options.log_file.clone()))?;
        tracing::debug!(message = "typewriter_demo started", ?cli_args);
    }

    let done_signal = Arc::new(Notify::new());

    let options = {
        let done_signal = done_signal.clone();
        TypewriterOptions::default()
            .with_speed(Duration::from_millis(cli_args.speed_ms))
            .with_cursor(!cli_args.no_cursor)
            .with_cursor_char(cli_args.cursor_char.as_str())
            .with_cursor_speed(Duration::from_millis(cli_args.cursor_speed_ms))
            .with_loop(cli_args.r#loop)
            .on_complete(move || done_signal.notify_one())
            .on_error(|error| tracing::error!(message = "typewriter failed", %error))
    };

    let typewriter = Typewriter::new(options);
    typewriter.attach(TerminalElement::stdout());

    // 01: queue the work, either from a script file or from the positional texts.
    if let Some(script_path) = &cli_args.script {
        Script::try_load(script_path)?.enqueue_into(&typewriter);
    } else {
        enqueue_texts(&typewriter, &cli_args.texts, Duration::from_millis(cli_args.pause_ms));
    }
    typewriter.start();

    // 02: wait until the queue drains (never in loop mode), Ctrl+C, or the time limit.
    let time_limit = async {
        match cli_args.duration_ms {
            Some(millis) => tokio::time::sleep(Duration::from_millis(millis)).await,
            None => std::future::pending::<()>().await,
        }
    };
    let wait_for_done = async {
        loop {
            done_signal.notified().await;
            if !cli_args.r#loop {
                break;
            }
        }
    };

    tokio::select! {
        () = wait_for_done => {},
        () = time_limit => {},
        _ = tokio::signal::ctrl_c() => {},
    }

    // 03: stop everything. Detaching clears the line, so print the final text again.
    let text = typewriter.text();
    drop(typewriter.detach());
    tracing::debug!(message = "typewriter_demo finished", %text);
    println!("{text}");

    Ok(())
}

/// Type each text, pause, then erase it before the next one. The last text stays.
fn enqueue_texts(typewriter: &Typewriter, texts: &[String], pause: Duration) {
    let last_index = texts.len().saturating_sub(1);
    for (index, text) in texts.iter().enumerate() {
        typewriter.write(text).stop(pause);
        if index != last_index {
            typewriter.delete(text.graphemes(true).count());
        }
    }
}

mod clap_config {
    use std::path::PathBuf;

    use clap::{Args, Parser};
    use miette::miette;

    /// More info: <https://docs.rs/clap/latest/clap/_derive/_tutorial/chapter_2/index.html>
    #[derive(Debug, Parser)]
    #[command(bin_name = "typewriter_demo")]
    #[command(about = "⌨️ Type text into the terminal, one grapheme at a time")]
    #[command(version)]
    #[command(next_line_help = true)]
    #[command(arg_required_else_help(true))]
    pub struct CLIArgs {
        #[arg(name = "texts", help = "Texts to type, erased one after the other.")]
        pub texts: Vec<String>,

        #[arg(long, default_value_t = 100, help = "Delay before each grapheme, in ms.")]
        pub speed_ms: u64,

        #[arg(long, help = "Don't show the blinking cursor while idle.")]
        pub no_cursor: bool,

        #[arg(long, default_value = "|", help = "Character used for the cursor.")]
        pub cursor_char: String,

        #[arg(long, default_value_t = 450, help = "Cursor blink interval, in ms.")]
        pub cursor_speed_ms: u64,

        #[arg(long = "loop", help = "Replay the texts forever, until Ctrl+C.")]
        pub r#loop: bool,

        #[arg(long, default_value_t = 1000, help = "Pause after each text, in ms.")]
        pub pause_ms: u64,

        #[arg(
            long,
            short = 's',
            help = "JSON script of steps to run instead of the texts."
        )]
        pub script: Option<PathBuf>,

        #[arg(long, help = "Exit after this many ms, even if still typing.")]
        pub duration_ms: Option<u64>,

        #[command(flatten)]
        pub global_options: GlobalOption,
    }

    impl CLIArgs {
        /// Without texts or a script nothing would ever be typed, and the demo would
        /// only wait for Ctrl+C.
        ///
        /// # Errors
        ///
        /// Returns an error if neither texts nor `--script` were given.
        pub fn ensure_has_work(&self) -> miette::Result<()> {
            if self.texts.is_empty() && self.script.is_none() {
                return Err(miette!(
                    code = "typewriter_demo::nothing_to_type",
                    help = "pass one or more texts, or --script <file>",
                    "nothing to type"
                ));
            }
            Ok(())
        }
    }

    #[derive(Debug, Args)]
    pub struct GlobalOption {
        #[arg(
            global = true,
            long,
            short = 'l',
            help = "Log app output to a file for debugging."
        )]
        pub enable_logging: bool,

        #[arg(
            global = true,
            long,
            help = "Log file path, used with --enable-logging."
        )]
        pub log_file: Option<String>,
    }
}
