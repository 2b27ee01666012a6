//! Subcommand implementations

use anyhow::{bail, Context, Result};
use davai_core::{
    sample_config, DavaiConfig, ExecutionMode, ProjectIdea, WorkflowOrchestrator, WorkflowResult,
};
use std::path::Path;

/// Flags of the `run` subcommand
pub struct RunArgs {
    pub mode: Option<ExecutionMode>,
    pub suggest: bool,
    pub no_save: bool,
    pub json: bool,
}

fn orchestrator(config: &DavaiConfig) -> Result<WorkflowOrchestrator> {
    WorkflowOrchestrator::from_config(config).context("Failed to set up the workflow")
}

pub fn questions(config: &DavaiConfig, idea: &str, json: bool) -> Result<()> {
    let questions = orchestrator(config)?.generate_questions(idea)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&questions)?);
    } else {
        for (i, question) in questions.iter().enumerate() {
            println!("{}. {}", i + 1, question);
        }
    }
    Ok(())
}

pub fn suggest(config: &DavaiConfig, idea: &str, json: bool) -> Result<()> {
    let orchestrator = orchestrator(config)?;
    let project_idea = ProjectIdea::new(idea)?;
    let questions = orchestrator.generate_questions(idea)?;
    let suggestions = orchestrator.suggest_answers(&project_idea, &questions)?;

    if json {
        let output = serde_json::json!({
            "questions": questions,
            "suggested_answers": suggestions.suggested_answers,
            "reasoning": suggestions.reasoning,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    for (i, (question, answer)) in questions
        .iter()
        .zip(&suggestions.suggested_answers)
        .enumerate()
    {
        println!("{}. {}\n   -> {}", i + 1, question, answer);
    }
    if !suggestions.reasoning.is_empty() {
        println!("\n{}", suggestions.reasoning);
    }
    Ok(())
}

/// Run the full workflow; returns whether it succeeded
pub fn run(config: &DavaiConfig, idea: &str, answers: Vec<String>, args: RunArgs) -> Result<bool> {
    let orchestrator = orchestrator(config)?;

    let mut options = orchestrator.default_options();
    if let Some(mode) = args.mode {
        options = options.with_mode(mode);
    }
    if args.suggest {
        options = options.with_suggestions(true);
    }
    if args.no_save {
        options = options.with_persist(false);
    }

    if answers.is_empty() && !options.include_suggestions {
        bail!(
            "No answers given: pass --answer/--answers-file, or --suggest to use suggested answers"
        );
    }

    let result = orchestrator.run_with(idea, answers, options);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&result);
    }
    Ok(result.success)
}

fn print_result(result: &WorkflowResult) {
    println!("Run {} ({})", result.run_id, result.mode);
    for step in &result.steps {
        let mark = if step.success { "ok  " } else { "FAIL" };
        match &step.error_message {
            Some(error) => println!("  [{}] {}: {}", mark, step.step_name, error),
            None => println!("  [{}] {}", mark, step.step_name),
        }
    }

    if let Some(documents) = &result.final_documentation {
        println!("\nGenerated {} documents:", documents.len());
        for name in documents.filenames() {
            println!("  {}", name);
        }
    }
    if let Some(path) = &result.output_path {
        println!("Saved to {}", path.display());
    }
    println!("Finished in {:.1}s", result.total_duration);
}

pub fn list(config: &DavaiConfig, json: bool) -> Result<()> {
    let projects = orchestrator(config)?.list_saved_projects()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&projects)?);
        return Ok(());
    }

    if projects.is_empty() {
        println!("No saved projects in {}", config.storage.output_dir.display());
        return Ok(());
    }
    for project in projects {
        println!(
            "{}  {}  {} documents  {}",
            project.folder_name,
            project.metadata.generated_at.format("%Y-%m-%d %H:%M:%S"),
            project.metadata.total_documents,
            first_line(&project.metadata.project_idea),
        );
    }
    Ok(())
}

pub fn show(config: &DavaiConfig, folder: &str, json: bool) -> Result<()> {
    let project = orchestrator(config)?.get_saved_project(folder)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&project)?);
        return Ok(());
    }

    println!("{}", project.project.metadata.project_idea);
    println!("{}", project.project.folder_path.display());
    for (name, content) in project.files.iter() {
        println!("\n==> {} <==\n{}", name, content);
    }
    Ok(())
}

pub fn init_config(dir: &Path, force: bool) -> Result<()> {
    let path = dir.join(".davai.toml");
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    std::fs::write(&path, sample_config())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}

/// Answers from a file: a JSON array of strings, or one answer per non-empty line
pub fn read_answers_file(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read answers from {}", path.display()))?;
    parse_answers(&content)
}

fn parse_answers(content: &str) -> Result<Vec<String>> {
    let trimmed = content.trim();
    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed).context("Answers file is not a JSON array of strings");
    }
    Ok(trimmed
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect())
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_answers_lines() {
        let answers = parse_answers("Students\n\n  Focus time  \n").unwrap();
        assert_eq!(answers, vec!["Students".to_string(), "Focus time".to_string()]);
    }

    #[test]
    fn test_parse_answers_json() {
        let answers = parse_answers(r#"["Multi\nline", "Two"]"#).unwrap();
        assert_eq!(answers, vec!["Multi\nline".to_string(), "Two".to_string()]);
        assert!(parse_answers("[1, 2]").is_err());
    }

    #[test]
    fn test_init_config_refuses_overwrite() {
        let dir = tempfile::TempDir::new().unwrap();
        init_config(dir.path(), false).unwrap();
        assert!(init_config(dir.path(), false).is_err());
        init_config(dir.path(), true).unwrap();
        assert!(dir.path().join(".davai.toml").exists());
    }
}
