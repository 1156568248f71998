use std::collections::VecDeque;

use futures::stream::{self, BoxStream};
use futures::StreamExt;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::core::client::transport::ByteStream;
use crate::core::stream::line_assembler::LineAssembler;
use crate::errors::{ClientResult, LogViewerError};

struct NdjsonState {
    // None once the body is exhausted or has failed
    body: Option<ByteStream>,
    assembler: LineAssembler,
    ready: VecDeque<String>,
}

/// Turns a chunked NDJSON body into a lazy, finite stream of decoded records.
///
/// Records are yielded as soon as their terminating newline arrives; nothing
/// is read from `body` until the consumer polls. Blank lines are skipped. An
/// unterminated fragment at end-of-stream is decoded as the final record.
/// The first error ends the stream.
pub fn ndjson_stream<T>(body: ByteStream) -> BoxStream<'static, ClientResult<T>>
where
    T: DeserializeOwned + Send + 'static,
{
    let state = NdjsonState {
        body: Some(body),
        assembler: LineAssembler::new(),
        ready: VecDeque::new(),
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(line) = state.ready.pop_front() {
                if line.trim().is_empty() {
                    continue;
                }
                let record = decode_line::<T>(&line);
                if record.is_err() {
                    state.body = None;
                    state.ready.clear();
                }
                return Some((record, state));
            }

            let body = state.body.as_mut()?;
            let next = body.next().await;
            match next {
                Some(Ok(chunk)) => match state.assembler.push(&chunk) {
                    Ok(lines) => state.ready.extend(lines),
                    Err(err) => return Some((Err(fail(&mut state, err)), state)),
                },
                Some(Err(err)) => return Some((Err(fail(&mut state, err)), state)),
                None => {
                    state.body = None;
                    match state.assembler.finish() {
                        Ok(Some(last)) => state.ready.push_back(last),
                        Ok(None) => debug!("ndjson stream finished"),
                        Err(err) => return Some((Err(err), state)),
                    }
                }
            }
        }
    })
    .boxed()
}

fn fail(state: &mut NdjsonState, err: LogViewerError) -> LogViewerError {
    warn!(error = %err, "ndjson stream aborted");
    state.body = None;
    state.ready.clear();
    err
}

fn decode_line<T: DeserializeOwned>(line: &str) -> ClientResult<T> {
    serde_json::from_str(line).map_err(|e| {
        LogViewerError::StreamDecodeError(format!("malformed record ({}): {}", e, truncate(line, 120)))
    })
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        format!("{}...<truncated>", s.chars().take(max_chars).collect::<String>())
    }
}
