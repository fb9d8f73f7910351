#![forbid(unsafe_code)]

mod logging;
mod script;

use std::cell::Cell;
use std::rc::Rc;

use anyhow::{bail, Result};
use chrono::{DateTime, TimeDelta, Utc};
use clap::{Parser, Subcommand};

use astragate_core::config::{self, GateConfig};
use astragate_core::operation::PendingOperation;
use astragate_core::profile::{self, UserProfile};
use astragate_core::traits::{AuditSink, SessionId, VoiceCapability};
use astragate_core::types::Role;
use astragate_engine::audit::{self, JsonlAuditSink};
use astragate_engine::dispatch::{Dispatch, Dispatcher};
use astragate_engine::gate::SecurityGate;
use astragate_engine::voice::{ScriptedCapability, UnavailableCapability};

use script::Step;

#[derive(Parser)]
#[command(
    name = "astragate",
    version,
    about = "Voice-confirmed security gate for sensitive assistant operations."
)]
struct Cli {
    /// Gate config JSON (default: .astragate/config.json when present).
    #[arg(long, global = true)]
    config: Option<String>,

    /// Debug logging on stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Show whether an operation is sensitive or admin-only.
    Classify {
        /// Operation name, e.g. "Delete reminder".
        operation: String,
    },

    /// List accepted confirmation phrases.
    Phrases,

    /// Write the default config to .astragate/config.json.
    Init {
        /// Overwrite an existing config.
        #[arg(long)]
        force: bool,
    },

    /// Dispatch a command and replay confirmation steps against its gate.
    Run {
        /// The spoken command, e.g. "send WhatsApp to Sam".
        command: String,

        /// Use the command text as the operation name verbatim.
        #[arg(long)]
        raw: bool,

        /// Acting user id.
        #[arg(long, default_value = "cli-user")]
        uid: String,

        /// Acting user role: user or admin.
        #[arg(long, default_value = "user")]
        role: Role,

        /// Load the acting user from a profile JSON instead of --uid/--role.
        #[arg(long)]
        profile: Option<String>,

        /// Dispatch with no signed-in user.
        #[arg(long)]
        signed_out: bool,

        /// Simulate a platform without speech recognition.
        #[arg(long)]
        no_voice: bool,

        /// Gate step, repeatable: listen, stop, say:<text>, fail:<reason>,
        /// override, clear-override, confirm, cancel, expire.
        #[arg(long = "step")]
        steps: Vec<Step>,

        /// Append gate events to this hash-chained JSONL file.
        #[arg(long)]
        audit: Option<String>,
    },

    /// Inspect a gate audit log.
    Audit {
        /// Path to the .jsonl audit file.
        file: String,

        /// Verify the hash chain.
        #[arg(long)]
        verify: bool,

        /// With --verify, check links from this 0-based entry on (for
        /// logs whose head was rotated away).
        #[arg(long, default_value_t = 0, requires = "verify")]
        from: u64,

        /// Print event counts per type as JSON.
        #[arg(long)]
        summary: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);
    let config = config::resolve_config(cli.config.as_deref())?;

    match cli.cmd {
        Cmd::Classify { operation } => cmd_classify(&config, &operation),

        Cmd::Phrases => cmd_phrases(&config),

        Cmd::Init { force } => cmd_init(force),

        Cmd::Run {
            command,
            raw,
            uid,
            role,
            profile,
            signed_out,
            no_voice,
            steps,
            audit,
        } => {
            let user = if signed_out {
                None
            } else if let Some(path) = profile {
                Some(profile::load_profile(&path)?)
            } else {
                Some(UserProfile::new(uid, role))
            };
            cmd_run(
                config,
                &command,
                raw,
                user.as_ref(),
                no_voice,
                &steps,
                audit.as_deref(),
            )
        }

        Cmd::Audit {
            file,
            verify,
            from,
            summary,
        } => cmd_audit(&file, verify, from, summary),
    }
}

fn cmd_classify(config: &GateConfig, operation: &str) -> Result<()> {
    let c = config.classify(operation);
    let out = serde_json::json!({
        "operation": operation,
        "sensitive": c.sensitive,
        "admin_only": c.admin_only,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn cmd_phrases(config: &GateConfig) -> Result<()> {
    for phrase in &config.accepted_phrases {
        println!("  {phrase}");
    }
    Ok(())
}

fn cmd_init(force: bool) -> Result<()> {
    let path = config::WORKSPACE_CONFIG_PATH;
    if std::path::Path::new(path).exists() && !force {
        bail!("{path} already exists (use --force to overwrite)");
    }
    astragate_engine::store::atomic::write_json(path, &GateConfig::default())?;
    eprintln!("created {path}");
    Ok(())
}

fn cmd_run(
    config: GateConfig,
    command: &str,
    raw: bool,
    user: Option<&UserProfile>,
    no_voice: bool,
    steps: &[Step],
    audit_path: Option<&str>,
) -> Result<()> {
    let executed = Rc::new(Cell::new(0u32));
    let action = {
        let executed = Rc::clone(&executed);
        let command = command.to_string();
        move || {
            tracing::info!(command = %command, "executing task");
            executed.set(executed.get() + 1);
        }
    };
    let op = if raw {
        PendingOperation::new(
            command,
            format!("This will run \"{command}\"."),
            action,
        )
    } else {
        PendingOperation::for_command(command, action)
    };
    let operation = op.operation_name.clone();
    let description = op.description.clone();

    let sink = audit_path.map(JsonlAuditSink::new);
    let mut dispatcher = Dispatcher::new(config);
    if let Some(s) = &sink {
        dispatcher = dispatcher.with_audit(Box::new(s.clone()));
    }

    let mut report = serde_json::json!({
        "operation": operation,
        "description": description,
        "user": user.map(|u| serde_json::json!({"uid": u.uid, "name": u.label(), "role": u.role})),
    });

    match dispatcher.dispatch(user, op) {
        Dispatch::Denied(err) => {
            report["dispatch"] = "denied".into();
            report["reason"] = err.to_string().into();
        }
        Dispatch::Executed => {
            report["dispatch"] = "executed".into();
        }
        Dispatch::Gated(pending) => {
            report["dispatch"] = "gated".into();
            let capability: Box<dyn VoiceCapability> = if no_voice {
                Box::new(UnavailableCapability)
            } else {
                Box::new(ScriptedCapability::new())
            };
            let config = dispatcher.config().clone();
            let mut gate = SecurityGate::new(capability, config.clone());
            if let Some(s) = &sink {
                gate = gate.with_audit(Box::new(s.clone()) as Box<dyn AuditSink>);
            }
            gate.open(pending)?;
            let trace = play_steps(&mut gate, &config, steps);
            report["steps"] = serde_json::Value::Array(trace);
            report["gate"] = serde_json::to_value(gate.snapshot())?;
            report["status"] = gate.status().as_str().into();
        }
    }

    report["executed"] = (executed.get() > 0).into();
    println!("{}", serde_json::to_string_pretty(&report)?);

    if executed.get() == 0 {
        bail!("operation '{operation}' was not executed");
    }
    Ok(())
}

fn play_steps(gate: &mut SecurityGate, config: &GateConfig, steps: &[Step]) -> Vec<serde_json::Value> {
    let mut last_session: Option<SessionId> = None;
    let mut trace = Vec::with_capacity(steps.len());

    for step in steps {
        let status = match step {
            Step::Listen => {
                let status = gate.start_voice_capture();
                if let Some(id) = gate.active_session() {
                    last_session = Some(id);
                }
                status
            }
            Step::Stop => gate.stop_voice_capture(),
            Step::Say(text) => match last_session {
                Some(id) => gate.capture_result(id, text),
                None => gate.status(),
            },
            Step::Fail(reason) => match last_session {
                Some(id) => gate.capture_error(id, reason),
                None => gate.status(),
            },
            Step::Override => gate.toggle_manual_override(true),
            Step::ClearOverride => gate.toggle_manual_override(false),
            Step::Confirm => gate.confirm(),
            Step::Cancel => gate.cancel(),
            Step::Expire => {
                let wait = config.listen_timeout().unwrap_or_default().saturating_add(1);
                let later = i64::try_from(wait)
                    .ok()
                    .and_then(TimeDelta::try_seconds)
                    .and_then(|d| Utc::now().checked_add_signed(d))
                    .unwrap_or(DateTime::<Utc>::MAX_UTC);
                gate.poll_timeout(later)
            }
        };
        let mut entry = serde_json::json!({
            "step": step.to_string(),
            "status": status.as_str(),
        });
        if let Some(err) = gate.last_error() {
            entry["last_error"] = err.to_string().into();
        }
        trace.push(entry);
    }
    trace
}

fn cmd_audit(file: &str, verify: bool, from: u64, summary: bool) -> Result<()> {
    if !verify && !summary {
        bail!("specify --verify or --summary");
    }
    if !std::path::Path::new(file).exists() {
        eprintln!("  no audit log found at {file}");
        return Ok(());
    }
    if verify {
        let count = if from == 0 {
            audit::log::verify_chain(file)?
        } else {
            audit::log::verify_chain_from(file, from)?
        };
        eprintln!("  audit chain valid ({count} entries)");
    }
    if summary {
        let counts = audit::log::summarize(file)?;
        println!("{}", serde_json::to_string_pretty(&counts)?);
    }
    Ok(())
}
