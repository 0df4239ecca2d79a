use clap::{Args, Subcommand};
use nutrisnap_core::Theme;

use crate::context::AppContext;

#[derive(Args)]
pub struct ThemeCommand {
    #[command(subcommand)]
    pub command: ThemeSubcommand,
}

#[derive(Subcommand)]
pub enum ThemeSubcommand {
    /// Show the current theme
    Show,

    /// Switch between light and dark
    Toggle,

    /// Set the theme explicitly
    Set {
        /// Theme (light, dark)
        theme: Theme,
    },
}

impl ThemeCommand {
    pub fn run(&self, ctx: &AppContext) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ThemeSubcommand::Show => {
                println!("{}", ctx.preferences.load_theme());
            }
            ThemeSubcommand::Toggle => {
                let theme = ctx.preferences.toggle_theme()?;
                println!("Theme set to {}", theme);
            }
            ThemeSubcommand::Set { theme } => {
                ctx.preferences.save_theme(*theme)?;
                println!("Theme set to {}", theme);
            }
        }
        Ok(())
    }
}
