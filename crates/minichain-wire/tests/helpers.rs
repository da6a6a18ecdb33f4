use minichain_core::{Chain, ChainConfig};
use minichain_wire::{Action, Handler, Request, Response};

pub fn quick_chain() -> Chain {
    Chain::with_config(ChainConfig {
        hash_rate_samples: 1_000,
        ..ChainConfig::default()
    })
}

pub fn send(
    handler: &Handler,
    chain: &mut Chain,
    action: Action,
    data: &str,
    difficulty: i64,
) -> Response {
    let line = Request::new(action, data, difficulty)
        .encode()
        .expect("request encodes");
    handler.handle_line(chain, &line)
}
