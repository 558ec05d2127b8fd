//! HTTP server task
//!
//! Accepts one connection at a time, parses the request line, forwards the
//! command to the control loop and writes its reply. Every response closes
//! the connection.

use defmt::*;
use embassy_net::tcp::{Error as TcpError, TcpSocket};
use embassy_net::Stack;
use embassy_time::Duration;
use embedded_io_async::Write;
use portable_atomic::{AtomicU32, Ordering};

use quizbox_core::command::{parse_request, Reply, RequestError};

use crate::channels::{COMMANDS, REPLIES};

/// Request head buffer; only the request line is used
const HEAD_BUF_LEN: usize = 1024;

/// Socket inactivity timeout
const SOCKET_TIMEOUT: Duration = Duration::from_secs(10);

/// Requests served since boot
static REQUESTS: AtomicU32 = AtomicU32::new(0);

/// HTTP server task - serves the command surface on `port`
#[embassy_executor::task]
pub async fn http_server_task(stack: Stack<'static>, port: u16) -> ! {
    info!("HTTP server listening on port {}", port);

    let mut rx_buffer = [0u8; 1024];
    let mut tx_buffer = [0u8; 512];
    let mut head = [0u8; HEAD_BUF_LEN];

    loop {
        let mut socket = TcpSocket::new(stack, &mut rx_buffer, &mut tx_buffer);
        socket.set_timeout(Some(SOCKET_TIMEOUT));

        if let Err(e) = socket.accept(port).await {
            warn!("Accept failed: {:?}", e);
            continue;
        }

        let n = REQUESTS.fetch_add(1, Ordering::Relaxed) + 1;
        debug!("Request #{} from {:?}", n, socket.remote_endpoint());

        if let Err(e) = serve(&mut socket, &mut head).await {
            warn!("Request #{} failed: {:?}", n, e);
        }

        socket.close();
        if let Err(e) = socket.flush().await {
            debug!("Flush on close failed: {:?}", e);
        }
    }
}

/// Handle one request on an accepted socket
async fn serve(socket: &mut TcpSocket<'_>, head: &mut [u8]) -> Result<(), TcpError> {
    let len = read_head(socket, head).await?;
    let request = &head[..len];

    let reply = if len == 0 || !request.contains(&b'\n') {
        Reply::from(RequestError::Malformed)
    } else {
        match parse_request(request) {
            Ok(command) => {
                REPLIES.reset();
                COMMANDS.send(command).await;
                REPLIES.wait().await
            }
            Err(e) => {
                debug!("Rejected: {:?}", e);
                Reply::from(e)
            }
        }
    };

    info!("{} {}", reply.status.code(), reply.status.reason());
    socket.write_all(reply.head().as_bytes()).await?;
    socket.write_all(reply.body()).await?;
    socket.flush().await
}

/// Read until the blank line ending the head, EOF or a full buffer
async fn read_head(socket: &mut TcpSocket<'_>, buf: &mut [u8]) -> Result<usize, TcpError> {
    let mut len = 0;
    while len < buf.len() {
        let n = socket.read(&mut buf[len..]).await?;
        if n == 0 {
            break;
        }
        len += n;
        if buf[..len].windows(4).any(|w| w == b"\r\n\r\n") {
            break;
        }
    }
    Ok(len)
}
