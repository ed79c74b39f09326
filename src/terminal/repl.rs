//! Interactive loop: one command per input line until `quit`

use crate::core::error::Result;
use crate::terminal::executor::CommandExecutor;
use std::io::{BufRead, Write};

const PROMPT: &str = "> ";

/// Read lines from `input`, execute each one and print its transcript
///
/// Blank lines go through the executor like any other input. Stops on
/// `quit`, `q` or end of input.
pub async fn run_repl<R: BufRead, W: Write>(
    executor: &CommandExecutor,
    input: R,
    mut output: W,
) -> Result<()> {
    writeln!(output, "\n=== THREADLINE ===")?;
    writeln!(output, "Type `help` for commands, `quit` to exit.\n")?;

    let mut lines = input.lines();
    loop {
        write!(output, "{}", PROMPT)?;
        output.flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let command = line.trim();

        if command == "quit" || command == "q" {
            break;
        }

        let result = executor.execute_one(command).await;
        writeln!(output, "{}\n", result.output)?;
    }

    writeln!(output, "Goodbye!")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryTranscript;
    use crate::terminal::executor::NO_COMMAND_MESSAGE;
    use crate::terminal::registry::CommandRegistry;
    use std::io::Cursor;
    use std::sync::Arc;

    fn executor() -> (CommandExecutor, Arc<InMemoryTranscript>) {
        let transcript = Arc::new(InMemoryTranscript::new());
        let executor = CommandExecutor::new(Arc::new(CommandRegistry::new()), transcript.clone());
        (executor, transcript)
    }

    #[tokio::test]
    async fn test_blank_line_reaches_executor() {
        let (exec, transcript) = executor();
        let mut out = Vec::new();

        run_repl(&exec, Cursor::new("\nnope\n"), &mut out).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains(NO_COMMAND_MESSAGE));
        assert!(text.contains("Unknown command: nope"));
        assert!(text.ends_with("Goodbye!\n"));
        assert_eq!(transcript.entries().len(), 2);
    }

    #[tokio::test]
    async fn test_quit_stops_before_remaining_lines() {
        let (exec, transcript) = executor();
        let mut out = Vec::new();

        run_repl(&exec, Cursor::new("q\nnope\n"), &mut out).await.unwrap();

        assert!(transcript.entries().is_empty());
        assert!(!String::from_utf8(out).unwrap().contains("nope"));
    }
}
