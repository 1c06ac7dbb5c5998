#![allow(dead_code)]

pub mod fixtures {
    use brrtbind::config::AppConfig;
    use brrtbind::registry::build_service;
    use brrtbind::server::AppService;

    /// Demo service with default limits
    pub fn demo_service() -> AppService {
        build_service(&AppConfig::default()).unwrap()
    }
}

pub mod multipart {
    /// Boundary used by [`Builder`]
    pub const BOUNDARY: &str = "brrtbind-test-boundary";

    /// Builds a `multipart/form-data` body.
    #[derive(Default)]
    pub struct Builder {
        body: Vec<u8>,
    }

    impl Builder {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn text(mut self, name: &str, value: &str) -> Self {
            self.body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
            self
        }

        pub fn file(mut self, name: &str, filename: &str, content_type: &str, data: &[u8]) -> Self {
            self.body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
                )
                .as_bytes(),
            );
            self.body.extend_from_slice(data);
            self.body.extend_from_slice(b"\r\n");
            self
        }

        pub fn finish(mut self) -> Vec<u8> {
            self.body
                .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
            self.body
        }

        pub fn content_type() -> String {
            format!("multipart/form-data; boundary={BOUNDARY}")
        }
    }
}

pub mod test_server {
    use std::sync::Once;

    /// Ensures May coroutines are configured only once
    static MAY_INIT: Once = Once::new();

    pub fn setup_may_runtime() {
        MAY_INIT.call_once(|| {
            may::config().set_stack_size(0x8000);
        });
    }
}

pub mod http {
    use std::io::{Read, Write};
    use std::net::{SocketAddr, TcpStream};
    use std::time::Duration;

    /// Send a raw HTTP/1.1 request and return `(status, body)`.
    pub fn send_request(addr: SocketAddr, raw: &[u8]) -> (u16, String) {
        let mut stream = TcpStream::connect(addr).unwrap();
        stream
            .set_read_timeout(Some(Duration::from_secs(2)))
            .unwrap();
        stream.write_all(raw).unwrap();

        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            if let Some((status, body)) = parse_complete(&buf) {
                return (status, body);
            }
            match stream.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => buf.extend_from_slice(&chunk[..n]),
                Err(e) => panic!("read failed: {e}"),
            }
        }
        parse_complete(&buf).expect("incomplete response")
    }

    fn parse_complete(buf: &[u8]) -> Option<(u16, String)> {
        let text = String::from_utf8_lossy(buf);
        let (head, body) = text.split_once("\r\n\r\n")?;
        let status = head.split_whitespace().nth(1)?.parse().ok()?;
        let length: usize = head
            .lines()
            .find_map(|l| {
                let (k, v) = l.split_once(':')?;
                k.eq_ignore_ascii_case("content-length")
                    .then(|| v.trim().parse().ok())?
            })
            .unwrap_or(0);
        (body.len() >= length).then(|| (status, body[..length].to_string()))
    }

    pub fn get(addr: SocketAddr, target: &str) -> (u16, String) {
        let raw = format!("GET {target} HTTP/1.1\r\nHost: localhost\r\n\r\n");
        send_request(addr, raw.as_bytes())
    }

    pub fn post_json(addr: SocketAddr, target: &str, body: &str, extra_headers: &str) -> (u16, String) {
        let raw = format!(
            "POST {target} HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\nContent-Length: {}\r\n{extra_headers}\r\n{body}",
            body.len()
        );
        send_request(addr, raw.as_bytes())
    }
}
