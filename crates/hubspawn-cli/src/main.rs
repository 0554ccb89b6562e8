// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! hubspawn - start, poll and stop per-user notebook pods.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use hubspawn_config::load_secret_env;
use hubspawn_k8s::KubeClient;
use hubspawn_spawner::{PollStatus, Spawner, UserSession};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

mod settings;

/// Provision per-user notebook server pods on a cluster.
#[derive(Parser, Debug)]
#[command(name = "hubspawn", about = "Per-user notebook pod spawner", version)]
struct Cli {
	/// Config file (defaults to /etc/hubspawn/hubspawn.toml)
	#[arg(long, env = "HUBSPAWN_CONFIG")]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Start (or adopt) the user's pod and print its address
	Start(StartArgs),
	/// Report whether the user's pod is running; exits 1 when it needs a restart
	Poll(UserArgs),
	/// Delete the user's pod
	Stop(UserArgs),
	/// Print the pod name a user maps to
	PodName(UserArgs),
	/// Show version information
	Version,
}

#[derive(Args, Debug)]
struct UserArgs {
	/// Hub username
	#[arg(long)]
	user: String,
}

#[derive(Args, Debug)]
struct StartArgs {
	#[command(flatten)]
	user: UserArgs,

	/// Hub API URL handed to the notebook server when no hub address is configured
	#[arg(long, default_value = "http://127.0.0.1:8081/hub/api")]
	hub_api_url: Url,

	/// Override the session cookie name
	#[arg(long)]
	cookie_name: Option<String>,

	/// Override the server base URL
	#[arg(long)]
	base_url: Option<String>,

	/// Override the hub prefix
	#[arg(long)]
	hub_prefix: Option<String>,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
	let cli = Cli::parse();

	if let Command::Version = cli.command {
		println!("hubspawn {}", env!("CARGO_PKG_VERSION"));
		return Ok(ExitCode::SUCCESS);
	}

	let config = match &cli.config {
		Some(path) => hubspawn_config::load_config_with_file(path)?,
		None => hubspawn_config::load_config()?,
	};

	// stdout is reserved for command output
	tracing_subscriber::registry()
		.with(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| config.logging.level.clone().into()),
		)
		.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
		.init();

	let (cluster, spawner_config) = settings::split(config);

	if let Command::PodName(args) = &cli.command {
		println!(
			"{}",
			hubspawn_spawner::pod_name(&spawner_config.pod_name_prefix, &args.user)
		);
		return Ok(ExitCode::SUCCESS);
	}

	tracing::info!(
		credentials = cluster.credentials.kind(),
		namespace = %spawner_config.namespace,
		"connecting to cluster"
	);
	let client = KubeClient::connect(&cluster).await?;
	let spawner = Spawner::new(Arc::new(client), spawner_config);

	match cli.command {
		Command::Start(args) => {
			let token = load_secret_env("HUBSPAWN_API_TOKEN")?
				.ok_or("HUBSPAWN_API_TOKEN (or HUBSPAWN_API_TOKEN_FILE) must be set")?;
			let mut session = UserSession::new(args.user.user, token, args.hub_api_url);
			if let Some(cookie_name) = args.cookie_name {
				session.server.cookie_name = cookie_name;
			}
			if let Some(base_url) = args.base_url {
				session.server.base_url = base_url;
			}
			if let Some(hub_prefix) = args.hub_prefix {
				session.hub.base_url = hub_prefix;
			}

			let endpoint = spawner.start(&mut session).await?;
			println!("{endpoint}");
			Ok(ExitCode::SUCCESS)
		}
		Command::Poll(args) => match spawner.poll(&args.user).await? {
			PollStatus::Alive => {
				println!("running");
				Ok(ExitCode::SUCCESS)
			}
			PollStatus::NeedsRestart => {
				println!("needs restart");
				Ok(ExitCode::FAILURE)
			}
		},
		Command::Stop(args) => {
			spawner.stop(&args.user).await?;
			println!("stopped {}", spawner.pod_name(&args.user));
			Ok(ExitCode::SUCCESS)
		}
		Command::PodName(_) | Command::Version => Ok(ExitCode::SUCCESS),
	}
}
