//! One SMTP probe conversation against one mail-exchange host.
//!
//! The session walks the server through EHLO (falling back to HELO),
//! MAIL FROM and RCPT TO, and classifies the RCPT reply without ever
//! sending message data. The transport is an unstructured byte stream:
//! incoming bytes are buffered and split on line terminators, a read may
//! surface zero or several complete lines, and a partial trailing line is
//! kept for the next read.
//!
//! Settlement is single-shot by construction: reply classification, socket
//! errors, the deadline, and an unexpected close all return out of the same
//! read loop, so whichever fires first decides the session and later
//! signals are never observed. `probe_host` releases the connection on
//! every settling path.

use crate::core::config::Config;
use crate::core::error::{AppError, Result};
use crate::core::models::{VerificationOutcome, VerificationStatus};
use crate::utils::smtp::reply::SmtpReply;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{timeout_at, Instant};

const READ_CHUNK: usize = 512;

/// Which server reply the session is waiting for next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    AwaitGreeting,
    AwaitEhloReply,
    AwaitHeloReply,
    AwaitMailFromReply,
    AwaitRcptReply,
}

struct ProbeSession<'a> {
    stream: TcpStream,
    buffer: Vec<u8>,
    state: SessionState,
    email: &'a str,
    host: &'a str,
    config: &'a Config,
    deadline: Instant,
}

/// Runs one probe attempt for `email` against `host`.
///
/// Returns an outcome when the conversation reached a protocol verdict, or
/// an error when the attempt died at the transport level (connect failure,
/// timeout, socket error, unexpected close). The orchestrator treats the
/// error case as grounds for failover to the next host.
pub async fn probe_host(email: &str, host: &str, config: &Config) -> Result<VerificationOutcome> {
    let deadline = Instant::now() + config.smtp_timeout;
    tracing::debug!(target: "smtp_task",
        "Connecting to {}:{} for <{}>", host, config.smtp_port, email);

    let stream = match timeout_at(deadline, TcpStream::connect((host, config.smtp_port))).await {
        Ok(Ok(stream)) => stream,
        Ok(Err(e)) => {
            tracing::debug!(target: "smtp_task", "Connect to {} failed: {}", host, e);
            return Err(AppError::Io(e));
        }
        Err(_) => {
            tracing::debug!(target: "smtp_task", "Connect to {} timed out", host);
            return Err(AppError::SmtpTimeout(config.smtp_timeout));
        }
    };
    stream.set_nodelay(true).ok();

    let mut session = ProbeSession {
        stream,
        buffer: Vec::new(),
        state: SessionState::AwaitGreeting,
        email,
        host,
        config,
        deadline,
    };
    let result = session.drive().await;
    session.release().await;

    match &result {
        Ok(outcome) => {
            tracing::debug!(target: "smtp_task",
                "Probe of <{}> via {} settled: {}", email, host, outcome.status);
        }
        Err(e) => {
            tracing::debug!(target: "smtp_task",
                "Probe of <{}> via {} failed: {}", email, host, e);
        }
    }
    result
}

impl ProbeSession<'_> {
    async fn drive(&mut self) -> Result<VerificationOutcome> {
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            let read = timeout_at(self.deadline, self.stream.read(&mut chunk)).await;
            let n = match read {
                Ok(Ok(0)) => return Err(AppError::ConnectionClosed(self.host.to_string())),
                Ok(Ok(n)) => n,
                Ok(Err(e)) => return Err(AppError::Io(e)),
                Err(_) => return Err(AppError::SmtpTimeout(self.config.smtp_timeout)),
            };
            self.buffer.extend_from_slice(&chunk[..n]);
            while let Some(line) = next_line(&mut self.buffer) {
                tracing::trace!(target: "smtp_task", "{} <- {}", self.host, line);
                if let Some(outcome) = self.on_reply_line(&line).await? {
                    return Ok(outcome);
                }
            }
        }
    }

    /// Feeds one complete line through the state machine. `Some` means the
    /// session reached a terminal classification.
    async fn on_reply_line(&mut self, line: &str) -> Result<Option<VerificationOutcome>> {
        let reply = SmtpReply::parse(line);
        if !reply.is_final() {
            return Ok(None);
        }

        match self.state {
            SessionState::AwaitGreeting => {
                if reply.code == 220 {
                    self.send(&format!("EHLO {}", self.config.helo_domain)).await?;
                    self.state = SessionState::AwaitEhloReply;
                    Ok(None)
                } else {
                    Ok(Some(self.terminal(
                        VerificationStatus::ConnectionRejected,
                        "Server rejected the connection",
                        &reply,
                    )))
                }
            }
            SessionState::AwaitEhloReply => {
                if reply.code == 250 {
                    self.send_mail_from().await?;
                } else {
                    // Older servers without ESMTP; not a failure yet.
                    self.send(&format!("HELO {}", self.config.helo_domain)).await?;
                    self.state = SessionState::AwaitHeloReply;
                }
                Ok(None)
            }
            SessionState::AwaitHeloReply => {
                if reply.code == 250 {
                    self.send_mail_from().await?;
                    Ok(None)
                } else {
                    self.quit().await;
                    Ok(Some(self.terminal(
                        VerificationStatus::HandshakeFailed,
                        "Server rejected both EHLO and HELO",
                        &reply,
                    )))
                }
            }
            SessionState::AwaitMailFromReply => {
                if reply.code == 250 {
                    self.send(&format!("RCPT TO:<{}>", self.email)).await?;
                    self.state = SessionState::AwaitRcptReply;
                    Ok(None)
                } else {
                    self.quit().await;
                    Ok(Some(self.terminal(
                        VerificationStatus::MailFromRejected,
                        "Server rejected the MAIL FROM sender",
                        &reply,
                    )))
                }
            }
            SessionState::AwaitRcptReply => {
                // QUIT goes out before classification, whatever the verdict.
                self.quit().await;
                let outcome = match reply.code {
                    250 => self.terminal(
                        VerificationStatus::Valid,
                        "Recipient accepted by mail server",
                        &reply,
                    ),
                    500..=599 => self.terminal(
                        VerificationStatus::Invalid,
                        "Recipient rejected by mail server",
                        &reply,
                    ),
                    400..=499 => self.terminal(
                        VerificationStatus::TemporaryFailure,
                        "Mail server reported a temporary failure",
                        &reply,
                    ),
                    other => self.terminal(
                        VerificationStatus::UnknownResponse,
                        format!("Unexpected reply code {other} to RCPT TO"),
                        &reply,
                    ),
                };
                Ok(Some(outcome))
            }
        }
    }

    fn terminal(
        &self,
        status: VerificationStatus,
        message: impl Into<String>,
        reply: &SmtpReply,
    ) -> VerificationOutcome {
        VerificationOutcome::new(self.email, status, message).with_response(reply.line.clone())
    }

    async fn send_mail_from(&mut self) -> Result<()> {
        self.send(&format!("MAIL FROM:<{}>", self.config.smtp_sender)).await?;
        self.state = SessionState::AwaitMailFromReply;
        Ok(())
    }

    async fn send(&mut self, command: &str) -> Result<()> {
        tracing::trace!(target: "smtp_task", "{} -> {}", self.host, command);
        let wire = format!("{command}\r\n");
        match timeout_at(self.deadline, self.stream.write_all(wire.as_bytes())).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(AppError::Io(e)),
            Err(_) => Err(AppError::SmtpTimeout(self.config.smtp_timeout)),
        }
    }

    /// Best effort; the classification already stands when this runs.
    async fn quit(&mut self) {
        let _ = timeout_at(self.deadline, self.stream.write_all(b"QUIT\r\n")).await;
    }

    async fn release(&mut self) {
        let _ = self.stream.shutdown().await;
    }
}

/// Pops the next complete line off `buffer`, leaving any partial trailing
/// line in place for the next read. Terminators are stripped; a lone LF is
/// tolerated alongside the standard CRLF.
fn next_line(buffer: &mut Vec<u8>) -> Option<String> {
    let newline = buffer.iter().position(|&b| b == b'\n')?;
    let mut line: Vec<u8> = buffer.drain(..=newline).collect();
    line.pop();
    if line.last() == Some(&b'\r') {
        line.pop();
    }
    Some(String::from_utf8_lossy(&line).into_owned())
}
