use anyhow::Context;
use astra_common::ResourceLocation;
use astra_hazard::{
    HazardEffects, SPACE_ADAPTED_MARKER, SimulationSide, SubjectRole, SubjectSnapshot, TypeTag,
};
use astra_kernel::{PolicyHost, SpawnOutcome};
use astra_spawn::{SpawnCandidate, SpawnPolicy};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "astra-cli", about = "CLI tool for spawn and hazard policy operations")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the whitelist state a policy file produces
    Describe {
        /// Policy document (.yaml, .yml or .json)
        #[arg(short, long)]
        policy: PathBuf,
    },
    /// Check whether a creature may spawn
    CheckSpawn {
        #[arg(short, long)]
        policy: PathBuf,
        /// Entity type, e.g. born_in_chaos_v1:decrepit_skeleton
        #[arg(short, long)]
        entity: ResourceLocation,
        #[arg(short, long)]
        dimension: ResourceLocation,
        /// Check by origin in this biome instead of by exact entity
        #[arg(short, long)]
        biome: Option<ResourceLocation>,
        /// Override the origin taken from the entity namespace
        #[arg(short, long)]
        origin: Option<String>,
    },
    /// List dimensions whose dimension whitelist names an origin
    Dimensions {
        #[arg(short, long)]
        policy: PathBuf,
        #[arg(short, long)]
        origin: String,
    },
    /// Run the oxygen hazard chain for a probe subject
    CheckHazard {
        /// Policy document supplying the exempt origin list
        #[arg(short, long)]
        policy: Option<PathBuf>,
        /// Full type identity, e.g. entity.minecraft.zombie
        #[arg(short, long)]
        type_id: String,
        #[arg(long, value_enum)]
        tag: Vec<TagArg>,
        #[arg(long)]
        space_adapted: bool,
        #[arg(long, value_enum, default_value = "ordinary")]
        role: RoleArg,
        /// Evaluate as a replica instead of the authoritative side
        #[arg(long)]
        replica: bool,
        #[arg(long)]
        non_living: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum TagArg {
    LivesWithoutOxygen,
    CanSurviveInSpace,
}

impl From<TagArg> for TypeTag {
    fn from(value: TagArg) -> Self {
        match value {
            TagArg::LivesWithoutOxygen => TypeTag::LivesWithoutOxygen,
            TagArg::CanSurviveInSpace => TypeTag::CanSurviveInSpace,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum RoleArg {
    Ordinary,
    Observer,
    Invulnerable,
}

impl From<RoleArg> for SubjectRole {
    fn from(value: RoleArg) -> Self {
        match value {
            RoleArg::Ordinary => SubjectRole::Ordinary,
            RoleArg::Observer => SubjectRole::Observer,
            RoleArg::Invulnerable => SubjectRole::Invulnerable,
        }
    }
}

/// Effects engine for probes: reports instead of damaging.
struct ConsoleEffects;

impl HazardEffects<SubjectSnapshot> for ConsoleEffects {
    fn apply_oxygen_effects(&mut self, subject: &SubjectSnapshot) {
        tracing::info!(subject = %subject.id, "oxygen effects applied");
    }
}

fn load_host(policy: Option<&Path>) -> anyhow::Result<PolicyHost<ConsoleEffects>> {
    let mut builder = PolicyHost::builder().effects(ConsoleEffects);
    if let Some(path) = policy {
        let policy = SpawnPolicy::load(path)
            .with_context(|| format!("loading policy {}", path.display()))?;
        builder = builder.policy(&policy);
    }
    Ok(builder.build()?)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Describe { policy } => {
            let host = load_host(Some(&policy))?;
            print!("{}", host.store().describe());
            println!("Stats: {}", host.store().stats());
            let hazardous: Vec<String> = host
                .hazardous_dimensions()
                .iter()
                .map(ToString::to_string)
                .collect();
            println!("Hazardous dimensions: [{}]", hazardous.join(", "));
            println!(
                "Exempt origins: [{}]",
                host.evaluator().exempt_origins().join(", ")
            );
        }
        Commands::CheckSpawn {
            policy,
            entity,
            dimension,
            biome,
            origin,
        } => {
            let mut host = load_host(Some(&policy))?;
            let mut candidate = SpawnCandidate::new(entity, dimension);
            if let Some(origin) = origin {
                candidate = candidate.with_origin(origin);
            }
            if let Some(biome) = biome {
                candidate = candidate.in_biome(biome);
            }

            let outcome = host.on_spawn_attempt(&candidate);
            println!(
                "{} ({}) in {}: {}",
                candidate.entity,
                candidate.origin,
                candidate.dimension,
                outcome.decision()
            );
            if let SpawnOutcome::Allowed {
                mark_space_adapted: true,
                ..
            } = outcome
            {
                println!("Spawn would be marked {SPACE_ADAPTED_MARKER}");
            }
        }
        Commands::Dimensions { policy, origin } => {
            let host = load_host(Some(&policy))?;
            let dimensions = host.store().dimensions_allowing_origin(&origin);
            if dimensions.is_empty() {
                println!("No dimension whitelists {origin}");
            }
            for dimension in dimensions {
                println!("{dimension}");
            }
        }
        Commands::CheckHazard {
            policy,
            type_id,
            tag,
            space_adapted,
            role,
            replica,
            non_living,
        } => {
            let mut host = load_host(policy.as_deref())?;
            let mut subject = SubjectSnapshot::living(type_id)
                .with_marker(SPACE_ADAPTED_MARKER, space_adapted)
                .with_role(role.into());
            for t in tag {
                subject = subject.with_tag(t.into());
            }
            if non_living {
                subject = subject.non_living();
            }
            let side = if replica {
                SimulationSide::Replica
            } else {
                SimulationSide::Authoritative
            };

            let verdict = host.on_entity_tick(side, &subject);
            println!("{}: {verdict}", subject.type_identity.as_deref().unwrap_or("?"));
        }
    }

    Ok(())
}
