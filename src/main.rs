use std::{
    env,
    io::{self, BufRead, Write},
};

use anyhow::{Context, Result};
use hanpath::{
    config::Config,
    export::render_content,
    generator::LlmGenerator,
    logging,
    path::{Direction, LessonOutcome, ModuleStatus, SelectOutcome, StepRef, Transition},
    store::FileStore,
    LearningPathEngine, Level,
};

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

const USAGE: &str = "Usage: hanpath <command>

Commands:
  levels                  list levels and their progress
  start <level>           open (or create) the path for a level
  show [--json]           show the current module
  open <module> <step>    open a step, generating its lesson if needed
       [--refresh]        regenerate the lesson even if it is cached
  regenerate <m> <s>      regenerate a step of a generated module
  complete                mark the current module complete
  next | prev             browse modules
  more                    generate new modules after finishing the path
  modules [--all]         list modules; --all includes completed generated ones
  switch                  leave the current level
  reset [--yes]           erase every learning path
  points                  show points and badges
  clear-points            reset points and badges";

enum Command {
    Levels,
    Start(Level),
    Show { json: bool },
    Open { module: usize, step: usize, refresh: bool },
    Regenerate { module: usize, step: usize },
    Complete,
    Navigate(Direction),
    More,
    Modules { all: bool },
    Switch,
    Reset { yes: bool },
    Points,
    ClearPoints,
}

fn parse_index(arg: Option<String>, name: &str) -> Result<usize> {
    let raw = arg.context(format!("{} is required", name))?;
    let index: usize = raw
        .parse()
        .context(format!("{} must be a number, got '{}'", name, raw))?;
    index
        .checked_sub(1)
        .context(format!("{} starts at 1", name))
}

fn parse_command(mut args: impl Iterator<Item = String>) -> Result<Command> {
    let name = args.next().context("a command is required")?;
    let rest: Vec<String> = args.collect();
    let flag = |f: &str| rest.iter().any(|a| a == f);
    let mut positional = rest.iter().filter(|a| !a.starts_with("--")).cloned();

    let command = match name.as_str() {
        "levels" => Command::Levels,
        "start" => {
            let level = positional.next().context("start needs a level")?;
            Command::Start(level.parse()?)
        }
        "show" => Command::Show { json: flag("--json") },
        "open" => Command::Open {
            module: parse_index(positional.next(), "module")?,
            step: parse_index(positional.next(), "step")?,
            refresh: flag("--refresh"),
        },
        "regenerate" => Command::Regenerate {
            module: parse_index(positional.next(), "module")?,
            step: parse_index(positional.next(), "step")?,
        },
        "complete" => Command::Complete,
        "next" => Command::Navigate(Direction::Next),
        "prev" => Command::Navigate(Direction::Previous),
        "more" => Command::More,
        "modules" => Command::Modules { all: flag("--all") },
        "switch" => Command::Switch,
        "reset" => Command::Reset { yes: flag("--yes") },
        "points" => Command::Points,
        "clear-points" => Command::ClearPoints,
        other => anyhow::bail!("unknown command '{}'", other),
    };
    Ok(command)
}

fn main() -> Result<()> {
    let config = Config::from_env();
    logging::init_tracing(&config.log_level);

    let command = match parse_command(env::args().skip(1)) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{USAGE}");
            return Err(e);
        }
    };

    let store = FileStore::open(&config.data_dir).context(format!(
        "failed to open data directory {}",
        config.data_dir.display()
    ))?;
    let mut engine = LearningPathEngine::new(store).context("failed to load learning paths")?;
    engine
        .restore_session()
        .context("failed to restore last session")?;
    let generator = LlmGenerator::new(config.llm.clone());

    run(&mut engine, &generator, command)?;

    if let Some(error) = engine.last_error() {
        eprintln!("{}", error);
    }
    if let Some(badge) = engine.take_badge_notice() {
        println!("{BOLD}Badge unlocked!{RESET} You now have {} badges.", badge.badges);
    }
    Ok(())
}

fn run(
    engine: &mut LearningPathEngine<FileStore>,
    generator: &LlmGenerator,
    command: Command,
) -> Result<()> {
    match command {
        Command::Levels => {
            for level in Level::ALL {
                println!("{:<13} {} modules completed", level, engine.progress(level));
            }
        }
        Command::Start(level) => {
            engine.select_level(level).context("failed to start level")?;
            print_module(engine);
        }
        Command::Show { json } if json => {
            let snapshot = serde_json::to_string_pretty(&engine.snapshot())
                .context("failed to serialize state")?;
            println!("{}", snapshot);
        }
        Command::Show { .. } => print_module(engine),
        Command::Open {
            module,
            step,
            refresh,
        } => {
            require_level(engine)?;
            let cached = engine
                .modules()
                .get(module)
                .and_then(|m| m.steps.get(step))
                .is_some_and(|s| s.content.is_some());
            if refresh || !cached {
                require_generator(generator)?;
            }
            let outcome = engine
                .select_step(generator, module, step, refresh)
                .context("failed to open step")?;
            report_selection(engine, outcome);
        }
        Command::Regenerate { module, step } => {
            require_level(engine)?;
            require_generator(generator)?;
            let outcome = engine
                .regenerate_step(generator, module, step)
                .context("failed to regenerate step")?;
            if outcome == SelectOutcome::Ignored {
                println!("Only steps of generated modules can be regenerated.");
            }
            report_selection(engine, outcome);
        }
        Command::Complete => {
            require_level(engine)?;
            match engine.complete_current_module()? {
                Transition::Applied => {
                    println!("Module complete. {} points.", engine.points().points())
                }
                Transition::Ignored => println!("Only the current module can be completed."),
            }
        }
        Command::Navigate(direction) => {
            require_level(engine)?;
            if engine.navigate_module(direction)? == Transition::Ignored {
                println!("No module in that direction is unlocked.");
            }
            print_module(engine);
        }
        Command::More => {
            require_level(engine)?;
            if engine.cursor() < engine.modules().len() {
                println!("Finish every module before generating more.");
                return Ok(());
            }
            require_generator(generator)?;
            println!("Generating new modules...");
            if engine.generate_more_modules(generator)? == Transition::Applied {
                print_module(engine);
            }
        }
        Command::Modules { all } => {
            require_level(engine)?;
            if all != engine.show_archived() {
                engine.toggle_archived_visibility();
            }
            for (index, module) in engine.visible_modules() {
                println!(
                    "{:>3}. [{}] {}",
                    index + 1,
                    status_label(engine.module_status(index)),
                    module.module_title
                );
            }
            if !all && engine.visible_modules().len() < engine.modules().len() {
                println!("(completed generated modules hidden, use --all to list them)");
            }
        }
        Command::Switch => {
            engine.switch_level()?;
            println!("Level closed. Use `start <level>` to pick one.");
        }
        Command::Reset { yes } => {
            let applied = engine.reset_all_paths(|| yes || confirm_reset())?;
            match applied {
                Transition::Applied => println!("All learning paths erased."),
                Transition::Ignored => println!("Reset cancelled."),
            }
        }
        Command::Points => {
            let points = engine.points();
            println!(
                "{BOLD}{}{RESET} points, {BOLD}{}{RESET} badges",
                points.points(),
                points.badges()
            );
        }
        Command::ClearPoints => {
            engine.points_mut().clear_progress()?;
            println!("Points and badges cleared.");
        }
    }
    Ok(())
}

fn require_level(engine: &LearningPathEngine<FileStore>) -> Result<Level> {
    engine
        .active_level()
        .context("no level selected, run `hanpath start <level>` first")
}

fn require_generator(generator: &LlmGenerator) -> Result<()> {
    if !generator.is_available() {
        anyhow::bail!("LLM_API_KEY is not set, so lessons cannot be generated");
    }
    Ok(())
}

fn confirm_reset() -> bool {
    print!("This erases all learning paths and progress. Type 'yes' to continue: ");
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer).is_ok() && answer.trim() == "yes"
}

fn status_label(status: ModuleStatus) -> &'static str {
    match status {
        ModuleStatus::Completed => "done",
        ModuleStatus::Current => "now ",
        ModuleStatus::Locked => "    ",
    }
}

fn print_module(engine: &LearningPathEngine<FileStore>) {
    let (Some(level), Some(module)) = (engine.active_level(), engine.viewed_module()) else {
        println!("No level selected.");
        return;
    };
    let index = engine.viewed_module_index();

    println!(
        "{BOLD}{}{RESET} module {}/{} ({} completed)",
        level,
        index + 1,
        engine.modules().len(),
        engine.cursor()
    );
    println!("{BOLD}{}{RESET}", module.module_title);
    println!("{}\n", module.module_description);

    let expanded = engine.expanded();
    for (step_index, step) in module.steps.iter().enumerate() {
        let cached = if step.content.is_some() { "*" } else { " " };
        println!(
            "  {}{}. [{}] {}",
            cached,
            step_index + 1,
            step.step_type.as_str(),
            step.title
        );
        let here = StepRef::new(index, step_index);
        if let Some(open) = expanded.filter(|e| e.step == here) {
            match &open.content {
                Some(content) => println!("\n{}\n", render_content(content)),
                None if open.loading => println!("\n    loading...\n"),
                None => println!("\n    not generated yet, open it again to generate\n"),
            }
        }
    }

    if engine.module_status(index) == ModuleStatus::Current {
        println!("\nRun `hanpath complete` when you have finished this module.");
    } else if engine.cursor() >= engine.modules().len() {
        println!("\nPath finished. Run `hanpath more` for new modules.");
    }
}

fn report_selection(engine: &LearningPathEngine<FileStore>, outcome: SelectOutcome) {
    match outcome {
        SelectOutcome::Collapsed => println!("Step closed."),
        SelectOutcome::Ignored => {}
        SelectOutcome::Fetched(LessonOutcome::Failed)
        | SelectOutcome::Fetched(LessonOutcome::Stale) => {}
        SelectOutcome::Cached | SelectOutcome::Fetched(LessonOutcome::Applied) => {
            if let Some(content) = engine.expanded().and_then(|e| e.content.as_ref()) {
                println!("{}", render_content(content));
            }
        }
    }
}
