mod token;

use self::token::*;
use std::collections::BTreeMap;
use structopt::StructOpt;

fn parse_permissions(raw: &str) -> Result<BTreeMap<String, String>, serde_json::Error> {
    serde_json::from_str(raw)
}

#[derive(Debug, StructOpt)]
#[structopt(about = "Mints fresh-baked GitHub App installation tokens! 🍪")]
struct Args {
    /// Account the repository belongs to.
    owner: String,
    /// Repository name, without the owner prefix.
    repo: String,
    /// Installation ID to use directly, skipping the lookup for the repo.
    #[structopt(long)]
    installation_id: Option<u64>,
    /// Permissions to grant, as a JSON object of permission name to access
    /// level, e.g. `{"contents": "read"}`.
    #[structopt(long, parse(try_from_str = parse_permissions))]
    permissions: Option<BTreeMap<String, String>>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::from_args();
    log::info!("received request for `{}/{}`", args.owner, args.repo);
    let env = Env::read()?;
    let base_url = env.api_url.clone();
    let api = GitHubClient::new(env.try_into()?, base_url);
    let token = fetch_installation_token(
        &api,
        &args.owner,
        &args.repo,
        args.installation_id,
        args.permissions.as_ref(),
    )
    .await?;
    println!("{}", token);
    Ok(())
}
