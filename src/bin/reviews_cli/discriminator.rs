//! Discriminator command - print the 8-byte account tag for type names

use anyhow::Result;
use clap::Parser;
use reviews_core::Discriminator;
use serde_json::json;

#[derive(Parser, Debug)]
#[command(about = "Print Anchor account discriminators")]
pub struct DiscriminatorCmd {
    /// Account type names, exactly as declared (case-sensitive)
    #[arg(required = true, value_name = "TYPE_NAME")]
    pub type_names: Vec<String>,
}

impl DiscriminatorCmd {
    pub fn execute(&self, json_output: bool) -> Result<()> {
        let tags: Vec<(&str, Discriminator)> = self
            .type_names
            .iter()
            .map(|name| (name.as_str(), Discriminator::derive(name)))
            .collect();

        if json_output {
            let entries: Vec<_> = tags
                .iter()
                .map(|(name, tag)| {
                    json!({
                        "type_name": name,
                        "hex": tag.to_string(),
                        "base58": tag.to_base58(),
                        "bytes": tag.as_bytes(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        } else {
            for (name, tag) in tags {
                println!("{}: {} (base58 {})", name, tag, tag.to_base58());
            }
        }
        Ok(())
    }
}
