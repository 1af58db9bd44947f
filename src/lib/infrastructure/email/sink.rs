//! In-process SMTP sink for tests
//!
//! Accepts a single connection, answers just enough of the protocol for lettre
//! to submit a message, and records every command plus the DATA payload.

use std::{io, net::SocketAddr};

use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::{TcpListener, TcpStream},
    task::JoinHandle,
};

/// What the sink saw during one SMTP session
#[derive(Debug, Default)]
pub struct Session {
    /// Command lines, in the order they were received
    pub commands: Vec<String>,

    /// The message submitted after DATA, without the terminating dot
    pub data: String,
}

impl Session {
    /// Whether any command starts with `verb`
    pub fn saw(&self, verb: &str) -> bool {
        self.commands
            .iter()
            .any(|command| command.to_ascii_uppercase().starts_with(verb))
    }

    /// Position of the first command starting with `verb`
    pub fn position(&self, verb: &str) -> Option<usize> {
        self.commands
            .iter()
            .position(|command| command.to_ascii_uppercase().starts_with(verb))
    }
}

/// A one-shot SMTP server bound to an ephemeral loopback port
#[derive(Debug)]
pub struct SmtpSink {
    address: SocketAddr,
    handle: JoinHandle<io::Result<Session>>,
}

impl SmtpSink {
    /// Starts a sink that accepts everything
    pub async fn start() -> io::Result<Self> {
        Self::start_with(&[]).await
    }

    /// Starts a sink that answers the given verbs with canned replies
    pub async fn start_with(overrides: &[(&'static str, &'static str)]) -> io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let address = listener.local_addr()?;
        let overrides = overrides.to_vec();

        let handle = tokio::spawn(async move {
            let (stream, _) = listener.accept().await?;
            serve(stream, &overrides).await
        });

        Ok(Self { address, handle })
    }

    /// The port the sink listens on
    pub fn port(&self) -> u16 {
        self.address.port()
    }

    /// Waits for the session to end and returns what was recorded
    pub async fn session(self) -> io::Result<Session> {
        self.handle
            .await
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?
    }
}

async fn serve(stream: TcpStream, overrides: &[(&'static str, &'static str)]) -> io::Result<Session> {
    let (read, mut write) = stream.into_split();
    let mut lines = BufReader::new(read).lines();
    let mut session = Session::default();

    write.write_all(b"220 sink ESMTP ready\r\n").await?;

    while let Some(line) = lines.next_line().await? {
        let verb = line
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_ascii_uppercase();

        session.commands.push(line);

        if let Some((_, reply)) = overrides.iter().find(|(v, _)| *v == verb) {
            write.write_all(reply.as_bytes()).await?;
            continue;
        }

        match verb.as_str() {
            "EHLO" | "HELO" => {
                write
                    .write_all(b"250-sink\r\n250 AUTH PLAIN LOGIN\r\n")
                    .await?
            }
            "AUTH" => write.write_all(b"235 2.7.0 Accepted\r\n").await?,
            "MAIL" | "RCPT" | "RSET" | "NOOP" => write.write_all(b"250 2.0.0 OK\r\n").await?,
            "DATA" => {
                write.write_all(b"354 End data with <CR><LF>.<CR><LF>\r\n").await?;

                while let Some(data) = lines.next_line().await? {
                    if data == "." {
                        break;
                    }

                    session.data.push_str(&data);
                    session.data.push_str("\r\n");
                }

                write.write_all(b"250 2.0.0 Queued\r\n").await?;
            }
            "QUIT" => {
                write.write_all(b"221 2.0.0 Bye\r\n").await?;
                break;
            }
            _ => write.write_all(b"502 5.5.2 Command not recognized\r\n").await?,
        }
    }

    Ok(session)
}
