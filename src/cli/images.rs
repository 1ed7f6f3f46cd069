//! Image commands registered on the dispatcher
//!
//! The handlers work against an in-memory [`ImageStore`] so the binary can be
//! exercised without a container engine. They show the handler contract:
//! streamed `Running` updates followed by one terminal result.

use crate::core::{
    Argument, Command, CommandOption, CommandOutput, Invocation, OutputSink, Progress,
    ProgressEntry, Status, Table, ValueKind,
};
use chrono::{DateTime, Utc};
use glob::Pattern;
use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    path::Path,
};
use tracing::{debug, instrument};

const LAYER_SIZE_MAX: u64 = 32 * 1024 * 1024;
const LAYER_CHUNKS: u64 = 4;

/// An image known to the local store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRecord {
    /// `None` for dangling images
    pub repository: Option<String>,
    pub tag: Option<String>,
    pub id: String,
    pub created: DateTime<Utc>,
    pub size: u64,
}

/// Images pulled or built during this process
#[derive(Debug, Default)]
pub struct ImageStore {
    images: Vec<ImageRecord>,
}

impl ImageStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn images(&self) -> &[ImageRecord] {
        &self.images
    }

    /// Add an image, replacing any image that had the same repository and tag
    pub fn insert(&mut self, record: ImageRecord) {
        if record.repository.is_some() {
            self.images
                .retain(|i| !(i.repository == record.repository && i.tag == record.tag));
        }
        self.images.push(record);
    }

    #[must_use]
    pub fn find(&self, repository: &str, tag: &str) -> Option<&ImageRecord> {
        self.images
            .iter()
            .find(|i| i.repository.as_deref() == Some(repository) && i.tag.as_deref() == Some(tag))
    }
}

/// Build the `image` command tree
#[must_use]
pub fn image_commands() -> Command<ImageStore> {
    Command::new("image", Some("img"), "Docker Image Commands")
        .option(CommandOption::flag(
            "quiet",
            Some("q"),
            "Suppress progress output",
        ))
        .subcommand(
            Command::new("pull", Some("pl"), "Docker Image Pull")
                .argument(Argument::new(
                    "Image Name",
                    ValueKind::String,
                    "Name of Docker Image to be pulled.",
                ))
                .handler(pull_handler),
        )
        .subcommand(
            Command::new("list", Some("ls"), "Docker Image List")
                .option(CommandOption::flag(
                    "all",
                    Some("a"),
                    "Show all images (default hides dangling images)",
                ))
                .option(CommandOption::new(
                    "filter",
                    Some("f"),
                    ValueKind::String,
                    "Only show repositories matching a glob pattern",
                ))
                .option(CommandOption::new(
                    "limit",
                    Some("n"),
                    ValueKind::Integer,
                    "Show at most this many images (0 for all)",
                ))
                .handler(list_handler),
        )
        .subcommand(
            Command::new("build", Some("make"), "Docker Image Build")
                .option(CommandOption::new(
                    "tag",
                    Some("t"),
                    ValueKind::String,
                    "Name and optionally a tag in the name:tag format",
                ))
                .argument(Argument::new(
                    "Folder | URL | -",
                    ValueKind::String,
                    "Docker resources to build (folder/url/stdin)",
                ))
                .handler(build_handler),
        )
}

#[instrument(skip_all)]
fn pull_handler(
    store: &mut ImageStore,
    invocation: &Invocation<'_>,
    output: &mut dyn OutputSink,
) -> Status {
    let Some(name) = invocation.arg_str(0).filter(|n| valid_reference(n)) else {
        output.on_error(Status::Unknown, CommandOutput::text("Image name not provided."));
        return Status::Unknown;
    };
    let (repository, tag) = split_reference(name);
    let quiet = invocation.flag("quiet");
    debug!("Pulling {}:{} (quiet={})", repository, tag, quiet);

    let layers = layer_ids(name);
    let mut progress = Progress::new();
    let mut size = 0;
    for layer in &layers {
        let total = layer_size(layer);
        size += total;
        let steps = std::iter::once(("Pulling fs layer", None))
            .chain((1..=LAYER_CHUNKS).map(|chunk| ("Downloading", Some(total * chunk / LAYER_CHUNKS))))
            .chain(std::iter::once(("Pull complete", None)));
        for (message, current) in steps {
            progress.update(ProgressEntry {
                id: layer.clone(),
                message: message.to_string(),
                current,
                total: current.map(|_| total),
                detail: current.map(|c| format!("{}/{}", human_size(c), human_size(total))),
            });
            if !quiet {
                output.on_success(Status::Running, CommandOutput::Progress(progress.clone()));
            }
        }
    }

    store.insert(ImageRecord {
        repository: Some(repository.to_string()),
        tag: Some(tag.to_string()),
        id: image_id(name),
        created: Utc::now(),
        size,
    });

    output.on_success(
        Status::Success,
        CommandOutput::text(format!("Image pull successful -> {name}")),
    );
    Status::Success
}

#[instrument(skip_all)]
fn list_handler(
    store: &mut ImageStore,
    invocation: &Invocation<'_>,
    output: &mut dyn OutputSink,
) -> Status {
    let pattern = match invocation.string("filter").filter(|f| !f.is_empty()) {
        Some(filter) => match Pattern::new(filter) {
            Ok(pattern) => Some(pattern),
            Err(e) => {
                output.on_error(
                    Status::Unknown,
                    CommandOutput::text(format!("Invalid filter {filter}: {e}")),
                );
                return Status::Unknown;
            }
        },
        None => None,
    };
    let limit = match invocation.int("limit").unwrap_or(0) {
        n if n < 0 => {
            output.on_error(
                Status::Unknown,
                CommandOutput::text(format!("Invalid limit {n}: must not be negative")),
            );
            return Status::Unknown;
        }
        0 => usize::MAX,
        n => usize::try_from(n).unwrap_or(usize::MAX),
    };
    let all = invocation.flag("all");

    output.on_success(Status::Success, CommandOutput::text("Listing images"));

    let mut table = Table::new(["REPOSITORY", "TAG", "IMAGE ID", "CREATED", "SIZE"]);
    let visible = store
        .images()
        .iter()
        .filter(|image| all || image.repository.is_some())
        .filter(|image| match (&pattern, &image.repository) {
            (Some(pattern), Some(repository)) => pattern.matches(repository),
            (Some(_), None) => false,
            (None, _) => true,
        })
        .take(limit);
    for image in visible {
        table.push_row([
            image.repository.clone().unwrap_or_else(|| "<none>".to_string()),
            image.tag.clone().unwrap_or_else(|| "<none>".to_string()),
            image.id.clone(),
            image.created.format("%Y-%m-%d %H:%M:%S").to_string(),
            human_size(image.size),
        ]);
    }
    debug!("Listing {} image(s)", table.len());

    output.on_success(Status::Success, CommandOutput::Table(table));
    Status::Success
}

#[instrument(skip_all)]
fn build_handler(
    store: &mut ImageStore,
    invocation: &Invocation<'_>,
    output: &mut dyn OutputSink,
) -> Status {
    let Some(context) = invocation.arg_str(0).filter(|c| !c.is_empty()) else {
        output.on_error(Status::Unknown, CommandOutput::text("Build context not provided."));
        return Status::Unknown;
    };
    let tag = invocation.string("tag").filter(|t| !t.is_empty());
    if tag.is_some_and(|t| !valid_reference(t)) {
        output.on_error(
            Status::Unknown,
            CommandOutput::text(format!("Invalid tag {}", tag.unwrap_or_default())),
        );
        return Status::Unknown;
    }

    let source = match context {
        "-" => "stdin".to_string(),
        c if c.contains("://") => c.to_string(),
        c => Path::new(c)
            .file_name()
            .map_or_else(|| c.to_string(), |n| n.to_string_lossy().into_owned()),
    };
    let steps = [
        format!("Sending build context from {source} to Docker daemon"),
        "Step 1/2 : FROM scratch".to_string(),
        format!("Step 2/2 : COPY {context} /"),
    ];
    if !invocation.flag("quiet") {
        for step in steps {
            output.on_success(Status::Running, CommandOutput::text(step));
        }
    }

    let id = image_id(&format!("build:{context}:{}", tag.unwrap_or_default()));
    let (repository, image_tag) = match tag {
        Some(t) => {
            let (r, t) = split_reference(t);
            (Some(r.to_string()), Some(t.to_string()))
        }
        None => (None, None),
    };
    store.insert(ImageRecord {
        repository,
        tag: image_tag,
        id: id.clone(),
        created: Utc::now(),
        size: layer_size(context),
    });

    output.on_success(
        Status::Success,
        CommandOutput::text(format!("Successfully built {id}")),
    );
    Status::Success
}

/// An image reference is non-empty and free of whitespace
fn valid_reference(name: &str) -> bool {
    !name.is_empty() && !name.chars().any(char::is_whitespace)
}

/// Split `repo:tag`, defaulting the tag to `latest`. A colon inside a registry host is not a tag separator.
fn split_reference(name: &str) -> (&str, &str) {
    match name.rsplit_once(':') {
        Some((repository, tag)) if !tag.contains('/') && !repository.is_empty() => {
            (repository, tag)
        }
        _ => (name, "latest"),
    }
}

fn digest(input: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    input.hash(&mut hasher);
    hasher.finish()
}

fn image_id(name: &str) -> String {
    format!("{:012x}", digest(name) & 0xffff_ffff_ffff)
}

/// Between one and three layer ids, stable for a given image name
fn layer_ids(name: &str) -> Vec<String> {
    let count = digest(name) % 3 + 1;
    (0..count)
        .map(|i| image_id(&format!("{name}#{i}")))
        .collect()
}

fn layer_size(layer: &str) -> u64 {
    digest(layer) % LAYER_SIZE_MAX + 1024
}

fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "kB", "MB", "GB"];
    #[allow(clippy::cast_precision_loss)]
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1000.0 && unit < UNITS.len() - 1 {
        size /= 1000.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes}{}", UNITS[0])
    } else {
        format!("{size:.1}{}", UNITS[unit])
    }
}
