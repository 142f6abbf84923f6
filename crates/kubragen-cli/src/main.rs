use std::{
    io::Write,
    path::{Path, PathBuf},
};

use clap::Parser;
use kg_traefik2::{Traefik2Builder, Traefik2Options};
use kubragen::{
    KubraGen,
    builder::Builder,
    data::Data,
    logging::initialize_logging,
    option::Options,
    yaml,
};
use snafu::{ResultExt, Snafu};
use tracing::info;

const APP_NAME: &str = "kg-traefik2";

#[derive(Debug, Snafu)]
enum Error {
    #[snafu(display("failed to read options file {}", path.display()))]
    ReadOptionsFile {
        source: std::io::Error,
        path: PathBuf,
    },

    #[snafu(display("failed to load options file {}", path.display()))]
    LoadOptions {
        source: kubragen::Error,
        path: PathBuf,
    },

    #[snafu(display("invalid option {path:?}"))]
    SetOption {
        source: kubragen::Error,
        path: &'static str,
    },

    #[snafu(display("failed to set up the traefik2 builder"))]
    CreateBuilder { source: kubragen::Error },

    #[snafu(display("failed to build {buildname:?}"))]
    Build {
        source: kubragen::Error,
        buildname: String,
    },

    #[snafu(display("failed to write manifests"))]
    WriteManifests { source: kubragen::Error },

    #[snafu(display("failed to flush output"))]
    FlushOutput { source: std::io::Error },
}

/// Prints the Kubernetes manifests of a Traefik 2 deployment as a YAML stream.
#[derive(Debug, Parser)]
#[command(name = APP_NAME, author, version, about)]
struct Opts {
    /// Namespace the namespaced objects are created in.
    #[arg(long)]
    namespace: Option<String>,

    /// Prefix of the object names.
    #[arg(long)]
    basename: Option<String>,

    /// YAML file with Traefik 2 builder options.
    #[arg(long, value_name = "FILE")]
    options: Option<PathBuf>,

    /// YAML file with project-wide options, the targets of option roots.
    #[arg(long, value_name = "FILE")]
    project_options: Option<PathBuf>,

    /// Build every group instead of only the ones the options require.
    #[arg(long)]
    all: bool,
}

#[snafu::report]
fn main() -> Result<(), Error> {
    let opts = Opts::parse();
    initialize_logging("KG_TRAEFIK2_LOG", APP_NAME);

    let mut project_options = Options::schemaless();
    if let Some(path) = &opts.project_options {
        project_options
            .merge_data(&load_options_file(path)?)
            .context(LoadOptionsSnafu { path })?;
    }
    let kubragen = KubraGen::new(project_options);

    let mut options = Traefik2Options::new();
    if let Some(path) = &opts.options {
        options
            .merge_data(&load_options_file(path)?)
            .context(LoadOptionsSnafu { path })?;
    }
    if let Some(namespace) = opts.namespace {
        options
            .set("namespace", namespace)
            .context(SetOptionSnafu { path: "namespace" })?;
    }
    if let Some(basename) = opts.basename {
        options
            .set("basename", basename)
            .context(SetOptionSnafu { path: "basename" })?;
    }

    let builder = Traefik2Builder::new(&kubragen, options).context(CreateBuilderSnafu)?;
    let buildnames = if opts.all {
        builder.build_names()
    } else {
        builder.build_names_required().context(CreateBuilderSnafu)?
    };
    builder
        .ensure_build_names(&buildnames)
        .context(CreateBuilderSnafu)?;

    let mut stdout = std::io::stdout().lock();
    for buildname in buildnames {
        let items = builder
            .build(buildname)
            .context(BuildSnafu { buildname })?;
        info!(buildname, count = items.len(), "writing objects");
        yaml::write_objects(&mut stdout, &items).context(WriteManifestsSnafu)?;
    }
    stdout.flush().context(FlushOutputSnafu)
}

/// Reads the first document of a YAML file, an empty file yields no options.
fn load_options_file(path: &Path) -> Result<Data, Error> {
    let content = std::fs::read_to_string(path).context(ReadOptionsFileSnafu { path })?;
    let documents = yaml::load_all(&content).context(LoadOptionsSnafu { path })?;
    Ok(documents
        .into_iter()
        .next()
        .filter(|document| !document.is_null())
        .unwrap_or_else(Data::mapping))
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use rstest::rstest;

    use super::*;

    #[test]
    fn verify_cli() {
        Opts::command().debug_assert();
    }

    #[rstest]
    #[case(&["kg-traefik2"], false, None)]
    #[case(&["kg-traefik2", "--all", "--namespace", "myns"], true, Some("myns"))]
    fn parse_args(#[case] args: &[&str], #[case] all: bool, #[case] namespace: Option<&str>) {
        let opts = Opts::try_parse_from(args).unwrap();
        assert_eq!(opts.all, all);
        assert_eq!(opts.namespace.as_deref(), namespace);
    }
}
