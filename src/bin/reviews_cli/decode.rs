//! Decode command - decode one account payload against the IDL

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use reviews_core::decode_account;
use reviews_types::encoding::base64_decode;

use anchor_reviews::ReviewsConfig;

#[derive(Parser, Debug)]
#[command(about = "Decode a base64 account payload as JSON")]
pub struct DecodeCmd {
    /// Account type name declared in the IDL
    #[arg(long = "type", value_name = "TYPE_NAME")]
    pub type_name: String,

    /// Account data, base64 (as returned by getAccountInfo)
    #[arg(long)]
    pub data: String,
}

impl DecodeCmd {
    pub fn execute(&self, config: &ReviewsConfig) -> Result<()> {
        let idl = config.load_idl()?;
        let payload = base64_decode(&self.data, "account data")?;
        let decoded = decode_account(&idl, &self.type_name, &payload)
            .map_err(|e| anyhow!(e))
            .with_context(|| format!("Failed to decode {} payload", self.type_name))?;
        println!("{}", serde_json::to_string_pretty(&decoded.to_json())?);
        Ok(())
    }
}
