use anyhow::{Context, Result};
use minichain_wire::{Action, Corruption, Request, Response};

pub const MENU: &str = "\
Block Chain Menu
0. View basic blockchain status.
1. Add a transaction to the blockchain.
2. Verify the blockchain.
3. View the blockchain.
4. Corrupt the chain.
5. Hide the corruption by repairing the chain.
6. Exit.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Choice {
    Send(Action),
    Exit,
}

pub fn parse_choice(input: &str) -> Option<Choice> {
    let choice = match input.trim() {
        "0" => Choice::Send(Action::ViewBlockchainStatus),
        "1" => Choice::Send(Action::AddTransaction),
        "2" => Choice::Send(Action::VerifyBlockchain),
        "3" => Choice::Send(Action::ViewBlockchain),
        "4" => Choice::Send(Action::CorruptBlockchain),
        "5" => Choice::Send(Action::RepairBlockchain),
        "6" => Choice::Exit,
        _ => return None,
    };
    Some(choice)
}

pub fn add_transaction(difficulty: &str, data: &str) -> Result<Request> {
    let difficulty = difficulty
        .trim()
        .parse::<i64>()
        .with_context(|| format!("difficulty {difficulty:?} is not a number"))?;
    Ok(Request::new(Action::AddTransaction, data, difficulty))
}

pub fn corrupt(block_id: &str, data: &str) -> Result<Request> {
    let index = block_id
        .trim()
        .parse::<i64>()
        .with_context(|| format!("block id {block_id:?} is not a number"))?;
    Ok(Request::new(
        Action::CorruptBlockchain,
        Corruption::new(index, data).to_payload(),
        0,
    ))
}

/// Lines to show the user for a response.
pub fn render_response(response: &Response) -> Vec<String> {
    let mut out = vec![response.message.clone()];
    if !response.success {
        out.push(format!("Operation failed: {}", response.message));
        return out;
    }
    match response.action.parse::<Action>() {
        Ok(Action::ViewBlockchainStatus) => {
            out.push(format!("Current size of chain: {}", response.chain_size));
            out.push(format!(
                "Difficulty of most recent block: {}",
                response.latest_block_difficulty
            ));
            out.push(format!(
                "Total difficulty for all blocks: {}",
                response.total_difficulty
            ));
            out.push(format!(
                "Approximate hashes per second on this machine: {}",
                response.hashes_per_second
            ));
            out.push(format!(
                "Expected total hashes required for the whole chain: {}",
                response.total_expected_hashes
            ));
            out.push(format!(
                "Nonce for most recent block: {}",
                response.latest_block_nonce
            ));
            out.push(format!("Chain hash: {}", response.chain_hash));
        }
        Ok(Action::ViewBlockchain) => {
            out.push(format!(
                "Blockchain Data:\n{}",
                response.blockchain_data.as_deref().unwrap_or_default()
            ));
        }
        _ => {}
    }
    out
}
