use std::net::IpAddr;

use clap::{Parser, Subcommand};

use super::{
    AnnuityPayload, DEFAULT_GOAL_TARGET, DividendPayload, PegPayload, annuity_response,
    dividend_response, peg_response,
};
use crate::core::Allocation;

#[derive(Parser, Debug)]
#[command(
    name = "finsight",
    about = "Personal-finance metrics: growth projections, drawdowns, allocation rebalancing and valuation ratios"
)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        default_value = "info",
        help = "Log filter directive, e.g. debug or finsight=trace; RUST_LOG takes precedence"
    )]
    pub log_level: String,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the JSON API.
    Serve {
        #[arg(long, default_value = "0.0.0.0")]
        host: IpAddr,
        #[arg(long, default_value_t = 8080)]
        port: u16,
        #[arg(
            long = "allocation",
            value_parser = parse_allocation,
            default_values = ["stocks=60", "bonds=30", "cash=10"],
            help = "Starting allocation as ID=PERCENT; repeat for each asset, summing to 100"
        )]
        allocations: Vec<Allocation>,
    },
    /// Future value of a monthly contribution plan.
    Annuity {
        #[arg(long)]
        monthly_contribution: f64,
        #[arg(long)]
        years: u32,
        #[arg(long, allow_negative_numbers = true, help = "Expected annual return in percent, e.g. 7")]
        annual_rate: f64,
        #[arg(long, default_value_t = DEFAULT_GOAL_TARGET)]
        target: f64,
    },
    /// Year-by-year dividend reinvestment trajectory.
    Dividends {
        #[arg(long)]
        initial_investment: f64,
        #[arg(long, help = "Current dividend yield in percent")]
        current_yield: f64,
        #[arg(long, allow_negative_numbers = true, help = "Annual dividend growth in percent")]
        growth_rate: f64,
        #[arg(long)]
        years: u32,
    },
    /// PEG ratio and valuation band.
    Peg {
        #[arg(long)]
        pe: f64,
        #[arg(long, allow_negative_numbers = true, help = "Expected earnings growth in percent")]
        growth_rate: f64,
    },
}

pub fn parse_allocation(raw: &str) -> Result<Allocation, String> {
    let (id, percent) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected ID=PERCENT, got `{raw}`"))?;
    let id = id.trim();
    if id.is_empty() {
        return Err(format!("missing asset id in `{raw}`"));
    }
    let percent = percent
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid percent in `{raw}`: {e}"))?;
    Ok(Allocation {
        id: id.to_string(),
        percent,
    })
}

/// Runs a one-shot command and returns its pretty-printed JSON result.
/// `Serve` is handled by the caller.
pub fn run_command(command: &Command) -> Result<String, String> {
    let json = match command {
        Command::Serve { .. } => return Err("serve is not a one-shot command".to_string()),
        Command::Annuity {
            monthly_contribution,
            years,
            annual_rate,
            target,
        } => {
            let payload = AnnuityPayload {
                monthly_contribution: *monthly_contribution,
                years: *years,
                annual_rate: *annual_rate,
                target: Some(*target),
            };
            let response = annuity_response(&payload).map_err(|e| e.to_string())?;
            serde_json::to_string_pretty(&response)
        }
        Command::Dividends {
            initial_investment,
            current_yield,
            growth_rate,
            years,
        } => {
            let payload = DividendPayload {
                initial_investment: *initial_investment,
                current_yield: *current_yield,
                growth_rate: *growth_rate,
                years: *years,
            };
            let response = dividend_response(&payload).map_err(|e| e.to_string())?;
            serde_json::to_string_pretty(&response)
        }
        Command::Peg { pe, growth_rate } => {
            let response = peg_response(&PegPayload {
                pe: *pe,
                growth_rate: *growth_rate,
            });
            serde_json::to_string_pretty(&response)
        }
    };
    json.map_err(|e| format!("failed to encode result: {e}"))
}
