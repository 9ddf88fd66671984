use sd_domain::config::{Config, ConfigSeverity};

/// Run all diagnostic checks and print a summary.
///
/// Returns `Ok(true)` when every check passes, `Ok(false)` when at
/// least one check failed.
pub async fn run(config: &Config, config_path: &str) -> anyhow::Result<bool> {
    println!("supportdesk doctor");
    println!("==================\n");

    let mut all_passed = true;

    // 1. Config file
    check_config_file(config_path, &mut all_passed);

    // 2. Config validation
    check_config_validation(config, &mut all_passed);

    // 3. Credentials in the environment
    check_env(
        "Completion API key",
        &config.completion.api_key_env,
        &mut all_passed,
    );
    check_env(
        "Record store API key",
        &config.records.api_key_env,
        &mut all_passed,
    );
    check_env(
        "Notification webhook URL",
        &config.notify.webhook_url_env,
        &mut all_passed,
    );

    // 4. Completion endpoint reachability
    check_completion_endpoint(config, &mut all_passed).await;

    // Summary
    println!();
    if all_passed {
        println!("All checks passed.");
    } else {
        println!("Some checks failed. Review the output above.");
    }

    Ok(all_passed)
}

// ── Individual checks ─────────────────────────────────────────────────

fn check_config_file(config_path: &str, all_passed: &mut bool) {
    let exists = std::path::Path::new(config_path).exists();
    print_check(
        "Config file exists",
        exists,
        if exists {
            config_path.to_owned()
        } else {
            format!("{config_path} not found (using defaults)")
        },
    );
    if !exists {
        *all_passed = false;
    }
}

fn check_config_validation(config: &Config, all_passed: &mut bool) {
    let issues = config.validate();
    let error_count = issues
        .iter()
        .filter(|e| e.severity == ConfigSeverity::Error)
        .count();

    if issues.is_empty() {
        print_check("Config validation", true, "no issues".into());
    } else {
        print_check(
            "Config validation",
            error_count == 0,
            format!("{} issue(s) ({} error(s))", issues.len(), error_count),
        );
        for issue in &issues {
            println!("      {issue}");
        }
        if error_count > 0 {
            *all_passed = false;
        }
    }
}

fn check_env(name: &str, var: &str, all_passed: &mut bool) {
    let set = std::env::var(var).is_ok();
    print_check(
        name,
        set,
        if set {
            format!("${var} is set")
        } else {
            format!("${var} is not set")
        },
    );
    if !set {
        *all_passed = false;
    }
}

async fn check_completion_endpoint(config: &Config, all_passed: &mut bool) {
    let url = &config.completion.base_url;
    let reachable = match reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()
    {
        Ok(client) => client.get(url).send().await.is_ok(),
        Err(_) => false,
    };

    print_check(
        "Completion endpoint reachable",
        reachable,
        if reachable {
            url.clone()
        } else {
            format!("{url} (unreachable)")
        },
    );

    if !reachable {
        *all_passed = false;
    }
}

// ── Formatting helper ─────────────────────────────────────────────────

fn print_check(name: &str, passed: bool, detail: String) {
    let status = if passed { "PASS" } else { "FAIL" };
    println!("  [{status}] {name}: {detail}");
}
