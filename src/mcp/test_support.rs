//! Scripted MCP servers for tests
//!
//! Small POSIX shell programs that speak the line-framed protocol. Request
//! ids are echoed back with `sed`, so responses correlate like a real server.

/// Answers initialize, tools/list and tools/call.
///
/// Tool behaviour by name: `fail` returns an error descriptor, `hang` never
/// answers, `slow` answers after a short pause, `noisy` prints a log line on
/// stdout before its reply, `exit` terminates the server, `echo` returns the
/// raw request line as text, anything else returns `reply-<id>` then `done`.
pub const FAKE_SERVER: &str = r#"
while IFS= read -r line; do
  id=$(printf '%s\n' "$line" | sed -n 's/.*"id":\([0-9][0-9]*\).*/\1/p')
  case "$line" in
    *'"method":"initialize"'*)
      printf '{"jsonrpc":"2.0","id":%s,"result":{"protocolVersion":"2024-11-05","capabilities":{"tools":{}},"serverInfo":{"name":"fake","version":"1.0.0"}}}\n' "$id" ;;
    *'"method":"tools/list"'*)
      printf '{"jsonrpc":"2.0","id":%s,"result":{"tools":[{"name":"echo","description":"Echo the request","inputSchema":{"type":"object","properties":{"text":{"type":"string"}},"required":["text"]}},{"name":"fail","description":"Always fails","inputSchema":{"type":"object"}}]}}\n' "$id" ;;
    *'"name":"fail"'*)
      printf '{"jsonrpc":"2.0","id":%s,"error":{"code":-32000,"message":"boom"}}\n' "$id" ;;
    *'"name":"hang"'*)
      : ;;
    *'"name":"slow"'*)
      sleep 0.2
      printf '{"jsonrpc":"2.0","id":%s,"result":{"content":[{"type":"text","text":"reply-%s"},{"type":"text","text":"done"}]}}\n' "$id" "$id" ;;
    *'"name":"noisy"'*)
      printf 'WARN: warming up\n'
      printf '{"jsonrpc":"2.0","id":%s,"result":{"content":[{"type":"text","text":"reply-%s"}]}}\n' "$id" "$id" ;;
    *'"name":"exit"'*)
      exit 0 ;;
    *'"name":"echo"'*)
      esc=$(printf '%s' "$line" | sed 's/\\/\\\\/g; s/"/\\"/g')
      printf '{"jsonrpc":"2.0","id":%s,"result":{"content":[{"type":"text","text":"%s"}]}}\n' "$id" "$esc" ;;
    *'"method":"tools/call"'*)
      printf '{"jsonrpc":"2.0","id":%s,"result":{"content":[{"type":"text","text":"reply-%s"},{"type":"text","text":"done"}]}}\n' "$id" "$id" ;;
    *)
      printf '{"jsonrpc":"2.0","id":%s,"error":{"code":-32601,"message":"Method not found"}}\n' "$id" ;;
  esac
done
"#;

/// Rejects the initialize handshake with an error descriptor.
pub const REJECTING_SERVER: &str = r#"
read -r line
printf '{"jsonrpc":"2.0","id":1,"error":{"code":-32602,"message":"unsupported protocol version"}}\n'
cat >/dev/null
"#;

/// Arguments for running `script` through `sh -c`
pub fn sh_args(script: &str) -> Vec<String> {
    vec!["-c".to_string(), script.to_string()]
}
