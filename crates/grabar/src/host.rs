//! Recording host: one session behind the message protocol.
//!
//! Over stdio the host speaks the browser native-messaging framing: a
//! 32-bit length in native byte order, then that many bytes of UTF-8 JSON.
//! Messages are handled strictly one at a time.

use std::io::{ErrorKind, Read, Write};

use crate::protocol::{Request, Response};
use crate::result::{GrabarError, GrabarResult};
use crate::script::{EmitOptions, ScriptEmitter};
use crate::session::RecordingSession;

/// Largest message the host may send to the browser (1 MiB)
pub const MAX_OUTGOING_MESSAGE: usize = 1024 * 1024;

/// Largest message the browser may send to the host (64 MiB)
pub const MAX_INCOMING_MESSAGE: usize = 64 * 1024 * 1024;

/// Answers protocol requests for a single session
#[derive(Debug, Clone, Default)]
pub struct RecordingHost {
    session: RecordingSession,
    emit_options: EmitOptions,
}

impl RecordingHost {
    /// Host whose `generateScript` defaults to `emit_options`
    #[must_use]
    pub fn new(emit_options: EmitOptions) -> Self {
        Self {
            session: RecordingSession::new(),
            emit_options,
        }
    }

    /// The session
    #[must_use]
    pub const fn session(&self) -> &RecordingSession {
        &self.session
    }

    /// Handle one request; failures become `success: false` responses
    pub fn handle(&mut self, request: Request) -> Response {
        let action = request.action();
        match self.dispatch(request) {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(action, %err, "request failed");
                Response::failure(err)
            }
        }
    }

    /// Parse and handle a JSON request
    pub fn handle_json(&mut self, json: &str) -> Response {
        match Request::parse(json) {
            Ok(request) => self.handle(request),
            Err(err) => {
                tracing::warn!(%err, "rejected message");
                Response::failure(err)
            }
        }
    }

    fn dispatch(&mut self, request: Request) -> GrabarResult<Response> {
        tracing::debug!(action = request.action(), "handling request");
        let session = &mut self.session;
        let response = match request {
            Request::StartRecording { url } => {
                session.start(url.as_deref())?;
                Response::ok()
                    .with_session(session.id(), session.state())
                    .with_count(session.len())
            }
            Request::StopRecording => {
                let actions = session.stop()?;
                Response::ok()
                    .with_session(session.id(), session.state())
                    .with_actions(actions)
            }
            Request::RecordAction(record) => {
                let recorded = session.record(record)?;
                Response::ok()
                    .with_recorded(recorded)
                    .with_count(session.len())
            }
            Request::GetRecordedActions => Response::ok().with_actions(session.actions().to_vec()),
            Request::ClearRecordedActions => {
                session.clear();
                Response::ok().with_count(0)
            }
            Request::GenerateScript(options) => {
                let options = options.unwrap_or_else(|| self.emit_options.clone());
                let script = ScriptEmitter::new(options).emit(session.actions())?;
                Response::ok()
                    .with_script(script.text)
                    .with_count(session.len())
            }
        };
        Ok(response)
    }

    /// Serve framed messages until the reader reaches EOF between messages.
    ///
    /// Returns the number of messages handled.
    pub fn serve<R: Read, W: Write>(&mut self, mut reader: R, mut writer: W) -> GrabarResult<usize> {
        let mut handled = 0;
        while let Some(body) = read_message(&mut reader)? {
            let response = match std::str::from_utf8(&body) {
                Ok(json) => self.handle_json(json),
                Err(err) => Response::failure(GrabarError::protocol(format!("invalid UTF-8: {err}"))),
            };
            send_response(&mut writer, &response)?;
            handled += 1;
        }
        tracing::info!(handled, "input closed, host exiting");
        Ok(handled)
    }
}

fn send_response<W: Write>(writer: &mut W, response: &Response) -> GrabarResult<()> {
    let body = serde_json::to_vec(response)?;
    match write_message(writer, &body) {
        Err(err @ GrabarError::MessageTooLarge { .. }) => {
            tracing::warn!(%err, "response dropped");
            let fallback = serde_json::to_vec(&Response::failure(err))?;
            write_message(writer, &fallback)
        }
        other => other,
    }
}

/// Read one framed message; `None` on EOF before the length prefix
pub fn read_message<R: Read>(reader: &mut R) -> GrabarResult<Option<Vec<u8>>> {
    let mut prefix = [0u8; 4];
    let mut filled = 0;
    while filled < prefix.len() {
        match reader.read(&mut prefix[filled..]) {
            Ok(0) if filled == 0 => return Ok(None),
            Ok(0) => {
                return Err(std::io::Error::new(
                    ErrorKind::UnexpectedEof,
                    "input closed inside a length prefix",
                )
                .into())
            }
            Ok(n) => filled += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => {}
            Err(err) => return Err(err.into()),
        }
    }

    let len = u32::from_ne_bytes(prefix) as usize;
    if len > MAX_INCOMING_MESSAGE {
        return Err(GrabarError::protocol(format!(
            "incoming message of {len} bytes exceeds {MAX_INCOMING_MESSAGE}"
        )));
    }
    let mut body = vec![0u8; len];
    reader.read_exact(&mut body)?;
    Ok(Some(body))
}

/// Write one framed message
pub fn write_message<W: Write>(writer: &mut W, body: &[u8]) -> GrabarResult<()> {
    if body.len() > MAX_OUTGOING_MESSAGE {
        return Err(GrabarError::MessageTooLarge {
            size: body.len(),
            limit: MAX_OUTGOING_MESSAGE,
        });
    }
    let len = u32::try_from(body.len()).map_err(|_| GrabarError::MessageTooLarge {
        size: body.len(),
        limit: MAX_OUTGOING_MESSAGE,
    })?;
    writer.write_all(&len.to_ne_bytes())?;
    writer.write_all(body)?;
    writer.flush()?;
    Ok(())
}
