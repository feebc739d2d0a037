use clap::Parser;
use sauth_common::types::Did;
use sauth_session::session::DEFAULT_MAX_AGE;

#[derive(Parser, Debug)]
pub enum Command {
    /// Generate a new SECRET and ES256 PRIVATE_JWK.
    GenerateSecrets,
    /// Check the settings for a deployment.
    Check(CheckArgs),
    /// Seal a session for the given DID into a cookie value.
    Seal(SealArgs),
    /// Open a sealed cookie value.
    Unseal(UnsealArgs),
}

#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Root URL the server is reached at, e.g. `http://127.0.0.1:8787`.
    #[arg(short, long)]
    pub(crate) root_url: String,
}

#[derive(Parser, Debug)]
pub struct SealArgs {
    /// DID of the signed-in account.
    #[arg(short, long)]
    pub(crate) did: Did,
    /// Lifetime in seconds.
    #[arg(short, long, default_value_t = DEFAULT_MAX_AGE)]
    pub(crate) max_age: u64,
}

#[derive(Parser, Debug)]
pub struct UnsealArgs {
    pub(crate) value: String,
}
