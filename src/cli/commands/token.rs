use clap::Args;
use serde::Serialize;

use crate::auth::TokenSigner;
use crate::cli::{utils, OutputFormat};
use crate::config::AppConfig;

#[derive(Debug, Args)]
pub struct TokenArgs {
    #[arg(long, help = "Role claim to embed (USER, ADMIN, SUPER, ...)")]
    pub role: Option<String>,

    #[arg(long, help = "Account email")]
    pub email: String,

    #[arg(long, help = "Subject id, defaults to the email")]
    pub sub: Option<String>,

    #[arg(long, help = "Lifetime in hours, defaults to the configured session lifetime")]
    pub hours: Option<u64>,
}

#[derive(Debug, Serialize)]
struct TokenOutput {
    token: String,
    cookie: String,
    expires_at: i64,
}

pub fn handle(args: TokenArgs, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let hours = args.hours.unwrap_or(config.security.session_expiry_hours);
    let signer = TokenSigner::new(config.security.jwt_secret.clone(), hours);

    let sub = args.sub.unwrap_or_else(|| args.email.clone());
    let claims = signer.claims_for(sub, args.email, None, args.role)?;
    let token = signer.sign(&claims)?;

    let output = TokenOutput {
        cookie: format!("{}={}", config.security.session_cookie, token),
        token,
        expires_at: claims.exp,
    };
    utils::output(output_format, &output, &[output.token.clone()])
}
