mod cli;

use hclbuilder::{BlockSelector, Document, Value};

fn main() {
    use clap::Parser;
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("HCLB_LOG"))
        .with_writer(std::io::stderr)
        .init();

    for new_path in cli.directory.iter() {
        match new_path.canonicalize() {
            Err(e) => {
                eprintln!(
                    "Failed to resolve path for -C/--directory {}\n{}",
                    new_path.display(),
                    e
                );
                std::process::exit(1);
            }
            Ok(cwd) => {
                if let Err(err) = std::env::set_current_dir(&cwd) {
                    eprintln!("Failed to set work directory to {}\n{}", cwd.display(), err,);
                    std::process::exit(1);
                }

                tracing::info!(directory=%cwd.display(), "Changed working directory");
            }
        }
    }

    let command_result = match cli.command {
        cli::Command::Render(cmd) => render(cmd),
        cli::Command::Set(cmd) => set(cmd),
        cli::Command::SetBlock(cmd) => set_block(cmd),
        cli::Command::Remove(cmd) => remove(cmd),
        cli::Command::Add(cmd) => add(cmd),
        cli::Command::Compose(cmd) => compose(cmd),
        cli::Command::Evaluate(cmd) => evaluate(cmd),
    };

    if let Err(e) = command_result {
        for error in e.chain() {
            eprintln!("{error}")
        }
        std::process::exit(1);
    }
}

pub fn render(cli: cli::RenderCommand) -> anyhow::Result<()> {
    let document = load(&cli.input)?;
    store(&cli.input, &document)
}

pub fn set(cli: cli::SetCommand) -> anyhow::Result<()> {
    let mut document = load(&cli.input)?;
    document.set_attribute(&cli.path, Value::infer(&cli.value));
    store(&cli.input, &document)
}

pub fn set_block(cli: cli::SetBlockCommand) -> anyhow::Result<()> {
    let mut document = load(&cli.input)?;
    let attributes = cli
        .attributes
        .into_iter()
        .map(|(key, value)| (key, Value::infer(&value)));

    document.set_block(&cli.path, attributes);
    store(&cli.input, &document)
}

pub fn remove(cli: cli::RemoveCommand) -> anyhow::Result<()> {
    let mut document = load(&cli.input)?;
    if cli.block {
        document.remove_block(&cli.path);
    } else {
        document.remove_attribute(&cli.path);
    }
    store(&cli.input, &document)
}

pub fn add(cli: cli::AddCommand) -> anyhow::Result<()> {
    let mut document = load(&cli.input)?;
    let selector = cli.block.map(BlockSelector::Path).unwrap_or_default();

    document.add_attribute_value(&selector, &cli.key, Value::infer(&cli.value));
    store(&cli.input, &document)
}

pub fn compose(cli: cli::ComposeCommand) -> anyhow::Result<()> {
    let documents = cli
        .files
        .iter()
        .map(Document::from_file)
        .collect::<Result<Vec<_>, _>>()?;

    let mut composed = Document::new();
    for document in &documents {
        composed.add(document);
    }

    print!("{}", composed.render()?);
    Ok(())
}

pub fn evaluate(cli: cli::EvaluateCommand) -> anyhow::Result<()> {
    use hcl::eval::Evaluate;

    let expr: hcl_edit::expr::Expression = cli.expression.parse()?;
    let expr: hcl::Expression = expr.into();
    let value: Value = expr.evaluate(&hcl::eval::Context::new())?.into();

    output(&cli.output, &value)?;
    Ok(())
}

fn load(input: &cli::InputArgs) -> anyhow::Result<Document> {
    match &input.file {
        Some(path) => Ok(Document::from_file(path)?),
        None => {
            let stdin = std::io::read_to_string(std::io::stdin())?;
            Ok(Document::from_text(&stdin)?)
        }
    }
}

fn store(input: &cli::InputArgs, document: &Document) -> anyhow::Result<()> {
    match &input.file {
        Some(path) if input.in_place => document.write_file(path)?,
        _ => print!("{}", document.render()?),
    }

    Ok(())
}

fn output(output: &cli::OutputArgs, value: &Value) -> anyhow::Result<()> {
    match output.format {
        cli::OutputFormat::Yaml => serde_yaml::to_writer(std::io::stdout(), value)?,
        cli::OutputFormat::Json => serde_json::to_writer_pretty(std::io::stdout(), value)?,
    };

    Ok(())
}
