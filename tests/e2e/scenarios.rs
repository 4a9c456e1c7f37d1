use httpmock::prelude::*;

use super::harness::{TestContext, TestEnv, parse_json, read_file, write_file};

pub struct Scenario {
    pub name: &'static str,
    pub run: fn(&TestContext) -> Result<(), String>,
}

pub fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "help_output",
            run: scenario_help,
        },
        Scenario {
            name: "missing_settings",
            run: scenario_missing_settings,
        },
        Scenario {
            name: "invalid_config_file",
            run: scenario_invalid_config_file,
        },
        Scenario {
            name: "discovery_error_is_fatal",
            run: scenario_discovery_error,
        },
        Scenario {
            name: "full_run_then_rerun",
            run: scenario_full_run_then_rerun,
        },
        Scenario {
            name: "dry_run",
            run: scenario_dry_run,
        },
        Scenario {
            name: "json_output",
            run: scenario_json_output,
        },
        Scenario {
            name: "settings_from_config_file",
            run: scenario_config_file,
        },
    ]
}

const GROUP_PATH: &str = "/api/v4/groups/team/projects";

/// Serve `clone_urls` as a single page of the group's project list
fn serve_projects(server: &MockServer, clone_urls: &[String]) {
    let entries: Vec<serde_json::Value> = clone_urls
        .iter()
        .map(|url| {
            serde_json::json!({
                "ssh_url_to_repo": url,
                "http_url_to_repo": url,
            })
        })
        .collect();
    let body = serde_json::to_string(&entries).unwrap_or_default();

    server.mock(|when, then| {
        when.method(GET)
            .path(GROUP_PATH)
            .header("PRIVATE-TOKEN", "secret")
            .query_param("page", "1");
        then.status(200).body(body);
    });
    server.mock(|when, then| {
        when.method(GET).path(GROUP_PATH).query_param("page", "2");
        then.status(200).body("[]");
    });
}

fn base_args(server: &MockServer) -> Vec<String> {
    vec![
        "--url".to_string(),
        server.base_url(),
        "--group".to_string(),
        "team".to_string(),
        "--token".to_string(),
        "secret".to_string(),
        "--library".to_string(),
        "mylib".to_string(),
        "--exclude-file".to_string(),
        "excluded.txt".to_string(),
    ]
}

fn run_with(
    ctx: &TestContext,
    env: &TestEnv,
    server: &MockServer,
    extra: &[&str],
) -> Result<super::harness::CommandOutput, String> {
    let mut args = base_args(server);
    args.extend(extra.iter().map(|s| s.to_string()));
    let refs: Vec<&str> = args.iter().map(String::as_str).collect();
    ctx.run_findlib(env, &refs)
}

/// Remotes shared by the run scenarios, in discovery order
fn standard_remotes(ctx: &TestContext, env: &TestEnv) -> Result<Vec<String>, String> {
    Ok(vec![
        ctx.create_remote(
            env,
            "alpha",
            &[("pkg/sub/requirements.txt", "requests==2.31\nmylib==2.0\n")],
        )?,
        ctx.create_remote(env, "beta", &[("src/app.py", "print('hi')\n")])?,
        ctx.missing_remote(env, "gamma"),
        ctx.create_remote(env, "delta", &[("requirements.txt", "mylib\n")])?,
        ctx.create_remote(
            env,
            "epsilon",
            &[("dev-requirements.txt", "  mylib-extra==1.0\n")],
        )?,
    ])
}

fn scenario_help(ctx: &TestContext) -> Result<(), String> {
    let env = ctx.create_env("help")?;
    let output = ctx.run_findlib(&env, &["--help"])?;
    output.assert_success()?;
    output.assert_stdout_contains("--library")?;
    output.assert_stdout_contains("--exclude-file")?;
    Ok(())
}

fn scenario_missing_settings(ctx: &TestContext) -> Result<(), String> {
    let env = ctx.create_env("missing")?;
    let output = ctx.run_findlib(&env, &["--library", "mylib"])?;
    output.assert_failure()?;
    output.assert_stderr_contains("Missing GitLab URL")?;
    output.assert_stderr_contains("FINDLIB_GITLAB_URL")?;
    Ok(())
}

fn scenario_invalid_config_file(ctx: &TestContext) -> Result<(), String> {
    let env = ctx.create_env("invalid-config")?;
    write_file(&env.xdg_config.join("findlib").join("config.json"), "{ nope")?;
    let output = ctx.run_findlib(&env, &["--library", "mylib"])?;
    output.assert_failure()?;
    output.assert_stderr_contains("Failed to parse config file")?;
    Ok(())
}

fn scenario_discovery_error(ctx: &TestContext) -> Result<(), String> {
    let env = ctx.create_env("discovery-error")?;
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path(GROUP_PATH);
        then.status(500).body("Internal Server Error");
    });

    let output = run_with(ctx, &env, &server, &[])?;
    output.assert_failure()?;
    output.assert_stderr_contains("HTTP 500")?;
    output.assert_stdout_not_contains("Results:")?;
    if env.root.join("excluded.txt").exists() {
        return Err("exclusion file written despite discovery failure".to_string());
    }
    Ok(())
}

fn scenario_full_run_then_rerun(ctx: &TestContext) -> Result<(), String> {
    if !ctx.command_available("git") {
        return Ok(());
    }
    let env = ctx.create_env("full-run")?;
    let remotes = standard_remotes(ctx, &env)?;
    let server = MockServer::start();
    serve_projects(&server, &remotes);
    write_file(&env.root.join("excluded.txt"), "delta\n")?;

    let output = run_with(ctx, &env, &server, &[])?;
    output.assert_success()?;
    output.assert_stdout_contains(
        "Checking projects (skipping excluded ones):\n - alpha\n - beta\n - gamma\n - delta (skipped)\n - epsilon\n\nResults:\n",
    )?;
    output.assert_stdout_contains("alpha:\n  pkg/sub/requirements.txt: mylib==2.0\n")?;
    output.assert_stdout_contains("beta: not found → adding to excluded.txt\n")?;
    output.assert_stdout_contains("gamma: not found → adding to excluded.txt\n")?;
    output.assert_stdout_contains("epsilon:\n  dev-requirements.txt: mylib-extra==1.0\n")?;
    output.assert_stdout_not_contains("delta:")?;

    let excluded = read_file(&env.root.join("excluded.txt"))?;
    if excluded != "delta\nbeta\ngamma\n" {
        return Err(format!("unexpected exclusion file: {:?}", excluded));
    }

    // Second run skips everything recorded by the first
    let output = run_with(ctx, &env, &server, &[])?;
    output.assert_success()?;
    output.assert_stdout_contains(" - beta (skipped)\n - gamma (skipped)\n")?;
    output.assert_stdout_contains("alpha:\n")?;
    let excluded = read_file(&env.root.join("excluded.txt"))?;
    if excluded != "delta\nbeta\ngamma\n" {
        return Err(format!("second run changed exclusions: {:?}", excluded));
    }
    Ok(())
}

fn scenario_dry_run(ctx: &TestContext) -> Result<(), String> {
    if !ctx.command_available("git") {
        return Ok(());
    }
    let env = ctx.create_env("dry-run")?;
    let remotes = vec![ctx.create_remote(&env, "beta", &[("requirements.txt", "flask\n")])?];
    let server = MockServer::start();
    serve_projects(&server, &remotes);

    let output = run_with(ctx, &env, &server, &["--dry-run"])?;
    output.assert_success()?;
    output.assert_stdout_contains("[dry-run] beta: not found")?;
    if env.root.join("excluded.txt").exists() {
        return Err("exclusion file written in dry-run mode".to_string());
    }
    Ok(())
}

fn scenario_json_output(ctx: &TestContext) -> Result<(), String> {
    if !ctx.command_available("git") {
        return Ok(());
    }
    let env = ctx.create_env("json")?;
    let remotes = standard_remotes(ctx, &env)?;
    let server = MockServer::start();
    serve_projects(&server, &remotes);
    write_file(&env.root.join("excluded.txt"), "delta\n")?;

    let output = run_with(ctx, &env, &server, &["--json"])?;
    output.assert_success()?;
    let json = parse_json(&output.stdout)?;
    let projects = json["projects"]
        .as_array()
        .ok_or("missing projects array")?;

    let statuses: Vec<&str> = projects
        .iter()
        .map(|p| p["status"].as_str().unwrap_or(""))
        .collect();
    if statuses != ["found", "not_found", "failed", "skipped", "found"] {
        return Err(format!("unexpected statuses: {:?}", statuses));
    }
    if projects[0]["matches"][0]["file"] != "pkg/sub/requirements.txt" {
        return Err(format!("unexpected match: {}", projects[0]));
    }
    if projects[2]["error"].as_str().is_none() {
        return Err("failed project has no error".to_string());
    }

    let excluded = read_file(&env.root.join("excluded.txt"))?;
    if excluded != "delta\nbeta\ngamma\n" {
        return Err(format!("unexpected exclusion file: {:?}", excluded));
    }
    Ok(())
}

fn scenario_config_file(ctx: &TestContext) -> Result<(), String> {
    if !ctx.command_available("git") {
        return Ok(());
    }
    let env = ctx.create_env("config-file")?;
    let remotes = vec![ctx.create_remote(
        &env,
        "alpha",
        &[("requirements.txt", "\u{feff}mylib>=1\n")],
    )?];
    let server = MockServer::start();
    serve_projects(&server, &remotes);

    let config = serde_json::json!({
        "gitlab_url": server.base_url(),
        "group": "team",
        "token": "secret",
        "library": "mylib",
        "exclude_file": "skip.txt",
    });
    let config_path = env.root.join("findlib.json");
    write_file(&config_path, &config.to_string())?;

    let output = ctx.run_findlib(
        &env,
        &["--config", config_path.to_str().ok_or("non-utf8 path")?],
    )?;
    output.assert_success()?;
    output.assert_stdout_contains("alpha:\n  requirements.txt: mylib>=1\n")?;
    Ok(())
}
