//! Demonstration entry point for the role hierarchy renderer.
//!
//! Builds the fixed scenes (Dog, Cat, Document, Student) from the built-in
//! registry, or from a catalog file given with `--catalog` or
//! `ROLECRAFT_CATALOG`, and writes every rendered line to stdout. `--json`
//! switches to one object per scene as NDJSON: the scene `header`, when it
//! has one, beside its render `record`.

use anyhow::{Context, Result, bail};
use rolecraft::runtime::{catalog_path_from_env, init_tracing};
use rolecraft::{
    KindName, RoleRegistry, Scene, builtin_registry, builtin_scenes, load_registry, play,
    split_list, transcript,
};
use std::env;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::debug;

fn main() {
    init_tracing();
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = CliArgs::parse()?;

    let catalog_path = args.catalog.clone().or_else(catalog_path_from_env);
    let (registry, scenes) = match &catalog_path {
        Some(path) => {
            let loaded = load_registry(path)?;
            (loaded.registry, loaded.scenes)
        }
        None => (
            builtin_registry().context("defining built-in kinds")?,
            builtin_scenes(),
        ),
    };
    debug!(catalog = ?catalog_path, scenes = scenes.len(), "prepared scenes");

    if let Some(kinds) = &args.kinds {
        check_kinds(&registry, kinds)?;
    }
    let scenes = filter_scenes(scenes, args.kinds.as_deref());
    let outputs = play(&registry, &scenes)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.json {
        for output in &outputs {
            serde_json::to_writer(&mut out, output)?;
            writeln!(out)?;
        }
    } else {
        for line in transcript(&outputs) {
            writeln!(out, "{line}")?;
        }
    }
    out.flush()?;
    Ok(())
}

fn check_kinds(registry: &RoleRegistry, kinds: &[String]) -> Result<()> {
    for kind in kinds {
        if registry.kind(&KindName::from(kind.as_str())).is_none() {
            bail!("Unknown kind requested: {kind}");
        }
    }
    Ok(())
}

fn filter_scenes(scenes: Vec<Scene>, kinds: Option<&[String]>) -> Vec<Scene> {
    match kinds {
        Some(kinds) => scenes
            .into_iter()
            .filter(|scene| kinds.iter().any(|kind| kind == scene.kind.as_str()))
            .collect(),
        None => scenes,
    }
}

struct CliArgs {
    catalog: Option<PathBuf>,
    kinds: Option<Vec<String>>,
    json: bool,
}

impl CliArgs {
    fn parse() -> Result<Self> {
        let mut args = env::args().skip(1);
        let mut catalog = None;
        let mut kinds = None;
        let mut json = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--catalog" => {
                    let value = args
                        .next()
                        .with_context(|| "--catalog requires a path")?;
                    catalog = Some(PathBuf::from(value));
                }
                "--kinds" => {
                    let value = args.next().with_context(|| "--kinds requires a list")?;
                    let list = split_list(&value);
                    if list.is_empty() {
                        bail!("--kinds requires at least one kind name");
                    }
                    kinds = Some(list);
                }
                "--json" => json = true,
                "--help" | "-h" => usage(0),
                other => {
                    eprintln!("Unknown argument: {other}");
                    usage(1);
                }
            }
        }

        Ok(Self {
            catalog,
            kinds,
            json,
        })
    }
}

fn usage(code: i32) -> ! {
    eprintln!(
        "Usage: role-demo [--catalog PATH] [--kinds LIST] [--json]\n\nOptions:\n  --catalog PATH   Load kinds and scenes from a role catalog (default: built-in; env ROLECRAFT_CATALOG).\n  --kinds LIST     Only render scenes whose kind is in LIST (comma or space separated).\n  --json           Emit each scene's header and render record as NDJSON instead of plain lines.\n\nExamples:\n  role-demo\n  role-demo --catalog catalog/roles.json --kinds Student --json"
    );
    std::process::exit(code);
}
