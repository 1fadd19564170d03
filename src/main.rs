//! Exit Settlement - order inspector
//!
//! Reads hex-encoded orders from stdin, one per line, and prints each
//! decoded order with the hash its maker must sign. The config file is
//! taken from `EXIT_SETTLEMENT_CONFIG`.

use std::io::{self, BufRead};
use std::process::ExitCode;

use exit_settlement::config::SettlementConfig;
use exit_settlement::types::amount::from_fixed;
use tracing::{error, info};

fn main() -> ExitCode {
    let config = match SettlementConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("config error: {e}");
            return ExitCode::FAILURE;
        }
    };
    config.logging.init();

    let codec = config.codec();
    info!(exchange = %config.exchange, num_ticks = codec.num_ticks(), "order inspector ready");

    let mut failures = 0usize;
    for (line_no, line) in io::stdin().lock().lines().enumerate() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                error!(%e, "failed to read stdin");
                return ExitCode::FAILURE;
            }
        };
        let input = line.trim();
        if input.is_empty() || input.starts_with('#') {
            continue;
        }

        let order = match codec.decode_hex(input) {
            Ok(order) => order,
            Err(e) => {
                error!(line = line_no + 1, %e, "undecodable order");
                failures += 1;
                continue;
            }
        };
        let hash = match codec.hash_for_exchange(&order) {
            Ok(hash) => hash,
            Err(e) => {
                error!(line = line_no + 1, %e, "unhashable order");
                failures += 1;
                continue;
            }
        };

        println!("order {}", line_no + 1);
        println!("  hash:       {hash}");
        println!("  market:     {}", order.market());
        println!("  maker:      {}", order.maker());
        println!("  exchange:   {}", order.exchange());
        if let (Some(side), Some(outcome)) = (order.side(), order.outcome()) {
            println!("  side:       {side:?} {outcome:?}");
        }
        println!("  price:      {}/{}", order.price, codec.num_ticks());
        println!(
            "  amount:     {} ({})",
            order.amount,
            from_fixed(order.amount).unwrap_or_else(|| "?".into())
        );
        println!("  expiration: {}", order.expiration);
        println!("  salt:       {}", order.salt);
        if let Some(token) = order.kyc_restriction() {
            println!("  kyc token:  {token}");
        }
        if order.exchange() != config.exchange {
            println!("  note: bound to a different exchange than configured");
        }
    }

    if failures > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
