pub mod handler;

use anyhow::{Result, anyhow};
use log::{error, info};
use std::io::Read;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::thread;
use std::time::Duration;
use tiny_http::{Header, Response, Server};

use crate::agent::TaskRouter;
use crate::server::handler::{Reply, handle};

pub use handler::EXECUTE_PATH;

/// Binds `addr` and serves requests until Ctrl-C.
pub fn run_server(addr: &str, router: &TaskRouter) -> Result<()> {
    let server =
        Server::http(addr).map_err(|e| anyhow!("Failed to bind agent endpoint on {addr}: {e:?}"))?;

    let running = Arc::new(AtomicBool::new(true));
    let r2 = running.clone();
    ctrlc::set_handler(move || {
        r2.store(false, Ordering::SeqCst);
    })?;

    info!("Agent endpoint listening on http://{}{}", server.server_addr(), EXECUTE_PATH);
    serve(&server, router, &running);
    info!("Agent endpoint stopped");
    Ok(())
}

/// Accept loop. Requests are handled one at a time; `running` is polled
/// between requests.
pub fn serve(server: &Server, router: &TaskRouter, running: &AtomicBool) {
    while running.load(Ordering::SeqCst) {
        let mut request = match server.recv_timeout(Duration::from_millis(500)) {
            Ok(Some(request)) => request,
            Ok(None) => continue,
            Err(e) => {
                error!("Agent endpoint failed to accept a request: {e}");
                thread::sleep(Duration::from_millis(500));
                continue;
            }
        };

        let mut body = Vec::new();
        if let Err(e) = request.as_reader().read_to_end(&mut body) {
            error!("Could not read request body: {e}");
            // an empty body is rejected with 422
            body.clear();
        }
        let reply = handle(router, request.method(), request.url(), &body);

        info!("{} {} -> {}", request.method(), request.url(), reply.status);
        if let Err(e) = request.respond(json_response(&reply)) {
            error!("Failed to write response: {e}");
        }
    }
}

fn json_response(reply: &Reply) -> Response<std::io::Cursor<Vec<u8>>> {
    let resp = Response::from_string(reply.body.to_string()).with_status_code(reply.status);
    match Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]) {
        Ok(h) => resp.with_header(h),
        Err(()) => resp,
    }
}
