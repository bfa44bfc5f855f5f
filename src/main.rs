use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_yaml::Value;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use wanderlog::frontmatter::{self, Fields};
use wanderlog::query::{
    BlogFilter, DateRange, QueryOptions, SearchOptions, SortField, SortOptions, SortOrder,
};
use wanderlog::values::format_values;
use wanderlog::{AggregatorConfig, BlogAggregator, BlogRecord, DirectorySource};

#[derive(Parser)]
#[command(
    name = "wanderlog",
    version,
    about = "Query a travel journal's markdown posts by frontmatter"
)]
struct Cli {
    #[arg(long, env = "WANDERLOG_DIR", help = "Directory holding the posts")]
    dir: Option<PathBuf>,

    #[arg(long, env = "WANDERLOG_CONFIG", help = "Path to wanderlog.toml")]
    config: Option<PathBuf>,

    #[arg(long, global = true, help = "Print JSON instead of text")]
    json: bool,

    #[arg(long, global = true, help = "Include draft posts")]
    drafts: bool,

    #[arg(short, long, global = true, action = clap::ArgAction::Count, help = "More log output")]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List posts matching the filters
    List(ListArgs),
    /// Show one post by slug
    Show { slug: String },
    /// Free-text search over titles, descriptions and tags
    Search {
        term: String,
        #[command(flatten)]
        list: ListArgs,
        #[arg(long, default_value_t = 0)]
        offset: usize,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Newest featured posts
    Featured {
        #[arg(default_value_t = 3)]
        count: usize,
    },
    /// Tags in use
    Tags {
        #[arg(long, help = "Show count for each tag")]
        count: bool,
    },
    /// Categories in use
    Categories {
        #[arg(long, help = "Show count for each category")]
        count: bool,
    },
    /// Collection statistics
    Stats,
    /// Posts grouped by year and month
    Archive,
    /// Posts with coordinates, as map pins
    Pins,
    /// Report ignored frontmatter, unreadable posts and validation problems
    Check,
    /// Print a frontmatter block for a new post
    New {
        slug: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        date: Option<String>,
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[arg(long)]
        category: Option<String>,
    },
}

#[derive(Args, Default)]
struct ListArgs {
    #[arg(long = "tag")]
    tags: Vec<String>,
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    author: Option<String>,
    #[arg(long)]
    featured: Option<bool>,
    #[arg(long)]
    has_location: Option<bool>,
    #[arg(long, help = "Earliest date, YYYY-MM-DD")]
    from: Option<NaiveDate>,
    #[arg(long, help = "Latest date, YYYY-MM-DD")]
    to: Option<NaiveDate>,
    #[arg(long, value_enum, default_value_t = SortField::Date)]
    sort: SortField,
    #[arg(long, value_enum, default_value_t = SortOrder::Desc)]
    order: SortOrder,
}

impl ListArgs {
    fn query_options(&self, include_drafts: bool) -> QueryOptions {
        let date_range = (self.from.is_some() || self.to.is_some()).then_some(DateRange {
            start: self.from,
            end: self.to,
        });
        QueryOptions {
            include_drafts,
            filter: BlogFilter {
                tags: self.tags.clone(),
                category: self.category.clone(),
                featured: self.featured,
                author: self.author.clone(),
                has_location: self.has_location,
                date_range,
            },
            sort: SortOptions::new(self.sort, self.order),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn default_log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        _ => "debug",
    }
}

fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_log_level(verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    if let Command::New {
        slug,
        title,
        date,
        tags,
        category,
    } = &cli.command
    {
        print!("{}", new_post(slug, title.as_deref(), date.as_deref(), tags, category.as_deref()));
        return Ok(ExitCode::from(0));
    }

    let cwd = std::env::current_dir().context("could not read the working directory")?;
    let mut config = AggregatorConfig::discover(cli.config.as_deref(), &cwd)?;
    if let Some(dir) = cli.dir {
        config.content_dir = dir;
    }
    if !config.content_dir.is_dir() {
        anyhow::bail!("no post directory at {}", config.content_dir.display());
    }

    let source = DirectorySource::new(config.content_dir.clone());
    let aggregator = BlogAggregator::new(source, config);
    let json = cli.json;

    match cli.command {
        Command::List(args) => {
            let records = aggregator.get_all_blog_meta(&args.query_options(cli.drafts)).await;
            emit_records(&records, json)
        }
        Command::Show { slug } => match aggregator.get_blog_by_slug(&slug).await {
            Some(post) if json => emit_json(&post),
            Some(post) => {
                print_record(&post.record);
                println!();
                println!("{}", post.content);
                Ok(ExitCode::from(0))
            }
            None => Ok(ExitCode::from(1)),
        },
        Command::Search {
            term,
            list,
            offset,
            limit,
        } => {
            let query = list.query_options(cli.drafts);
            let options = SearchOptions {
                query: Some(term),
                filter: query.filter,
                sort: query.sort,
                include_drafts: query.include_drafts,
                offset,
                limit,
            };
            let results = aggregator.search_blogs(&options).await;
            if json {
                return emit_json(&results);
            }
            for record in &results.blogs {
                print_record_line(record);
            }
            if results.has_more {
                eprintln!("{} of {} shown", results.blogs.len(), results.total);
            }
            Ok(found(!results.blogs.is_empty()))
        }
        Command::Featured { count } => {
            emit_records(&aggregator.get_featured_blogs(count).await, json)
        }
        Command::Tags { count } => {
            let counts = aggregator.get_tags_with_counts(cli.drafts).await;
            if json {
                return emit_json(&counts);
            }
            emit_lines(format_values(&counts, count))
        }
        Command::Categories { count } => {
            let counts = aggregator.get_categories_with_counts(cli.drafts).await;
            if json {
                return emit_json(&counts);
            }
            emit_lines(format_values(&counts, count))
        }
        Command::Stats => {
            let stats = aggregator.get_blog_stats().await;
            if json {
                return emit_json(&stats);
            }
            println!("total: {}", stats.total);
            println!("published: {}", stats.published);
            println!("drafts: {}", stats.drafts);
            println!("featured: {}", stats.featured);
            println!("with location: {}", stats.with_location);
            println!("tags: {}", stats.total_tags);
            println!("categories: {}", stats.total_categories);
            println!("recent: {}", stats.recent_posts);
            for (author, n) in &stats.authors {
                println!("author {author}: {n}");
            }
            Ok(ExitCode::from(0))
        }
        Command::Archive => {
            let archive = aggregator.get_blog_archive().await;
            if json {
                return emit_json(&archive);
            }
            for year in &archive {
                println!("{} ({})", year.year, year.count);
                for month in &year.months {
                    println!("  {} ({})", month.name, month.count);
                    for post in &month.posts {
                        println!("    {}  {}", post.slug, post.title);
                    }
                }
            }
            Ok(found(!archive.is_empty()))
        }
        Command::Pins => {
            let pins = aggregator.get_blog_map_pins().await;
            if json {
                return emit_json(&pins);
            }
            for pin in &pins {
                println!("{}\t{:.5}\t{:.5}\t{}", pin.id, pin.lat, pin.lng, pin.title);
            }
            Ok(found(!pins.is_empty()))
        }
        Command::Check => {
            let reports = aggregator.check().await;
            if json {
                emit_json(&reports)?;
            } else {
                for report in reports.iter().filter(|r| !r.is_clean()) {
                    println!("{}", report.path);
                    let validation = report.validation.iter();
                    let problems = report
                        .frontmatter_error
                        .iter()
                        .chain(&report.extract_error)
                        .chain(validation.clone().flat_map(|v| &v.errors))
                        .chain(validation.flat_map(|v| &v.warnings));
                    for problem in problems {
                        println!("  {problem}");
                    }
                }
            }
            Ok(found(reports.iter().all(|r| r.is_clean())))
        }
        Command::New { .. } => Ok(ExitCode::from(0)),
    }
}

fn new_post(
    slug: &str,
    title: Option<&str>,
    date: Option<&str>,
    tags: &[String],
    category: Option<&str>,
) -> String {
    let mut fields = Fields::new();
    let title = title
        .map(str::to_string)
        .or_else(|| wanderlog::record::title_case_slug(slug))
        .unwrap_or_else(|| "Untitled".to_string());
    fields.insert("title".to_string(), Value::String(title));
    let date = date
        .map(str::to_string)
        .unwrap_or_else(|| chrono::Local::now().date_naive().to_string());
    fields.insert("date".to_string(), Value::String(date));
    fields.insert(
        "tags".to_string(),
        Value::Sequence(tags.iter().cloned().map(Value::String).collect()),
    );
    if let Some(category) = category {
        fields.insert("category".to_string(), Value::String(category.to_string()));
    }
    let merged = frontmatter::merge(&[&fields]);
    frontmatter::create(&merged)
}

fn found(any: bool) -> ExitCode {
    if any {
        ExitCode::from(0)
    } else {
        ExitCode::from(1)
    }
}

fn emit_json<T: Serialize>(value: &T) -> anyhow::Result<ExitCode> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(ExitCode::from(0))
}

fn emit_lines(lines: Vec<String>) -> anyhow::Result<ExitCode> {
    for line in &lines {
        println!("{line}");
    }
    Ok(found(!lines.is_empty()))
}

fn emit_records(records: &[BlogRecord], json: bool) -> anyhow::Result<ExitCode> {
    if json {
        emit_json(&records)?;
    } else {
        for record in records {
            print_record_line(record);
        }
    }
    Ok(found(!records.is_empty()))
}

fn print_record_line(record: &BlogRecord) {
    println!(
        "{}\t{}\t{}",
        record.date.as_deref().unwrap_or("-"),
        record.slug,
        record.title
    );
}

fn print_record(record: &BlogRecord) {
    println!("{}", record.title);
    if let Some(date) = &record.date {
        println!("date: {date}");
    }
    println!("author: {}", record.author);
    if let Some(category) = &record.category {
        println!("category: {category}");
    }
    if !record.tags.is_empty() {
        println!("tags: {}", record.tags.join(", "));
    }
    if let Some(name) = record.location.as_ref().and_then(|l| l.name.as_deref()) {
        println!("location: {name}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_post_round_trips() {
        let block = new_post(
            "night-train",
            None,
            Some("2024-05-05"),
            &["rail".to_string()],
            Some("europe"),
        );
        let doc = frontmatter::parse(&block);
        assert!(doc.has_frontmatter);
        assert_eq!(doc.get_str("title"), Some("Night Train"));
        assert_eq!(doc.get_str("date"), Some("2024-05-05"));
        assert_eq!(doc.get_str("category"), Some("europe"));
        assert_eq!(doc.tags(), vec!["rail"]);
        assert!(!doc.get_bool("draft"));
    }

    #[test]
    fn test_list_args_build_date_range() {
        let args = ListArgs {
            from: NaiveDate::from_ymd_opt(2024, 1, 1),
            ..ListArgs::default()
        };
        let options = args.query_options(false);
        let range = options.filter.date_range.unwrap();
        assert!(range.end.is_none());
        assert_eq!(range.start, NaiveDate::from_ymd_opt(2024, 1, 1));

        assert!(ListArgs::default().query_options(true).filter.date_range.is_none());
    }

    #[test]
    fn test_single_verbose_flag_enables_debug() {
        assert_eq!(default_log_level(0), "warn");
        assert_eq!(default_log_level(1), "debug");
        assert_eq!(default_log_level(3), "debug");

        let cli = Cli::try_parse_from(["wanderlog", "-v", "stats"]).unwrap();
        assert_eq!(default_log_level(cli.verbose), "debug");
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from([
            "wanderlog", "--dir", "posts", "search", "lisbon", "--tag", "food", "--limit", "5",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::Search { limit: Some(5), .. }));
    }
}
