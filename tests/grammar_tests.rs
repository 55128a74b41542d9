#[cfg(test)]
mod tests {
    use clap::Parser;
    use conductr::bundle::shell_variable;
    use conductr::cli::{Args, Commands};

    fn parse(tokens: &[&str]) -> Args {
        Args::try_parse_from(tokens).expect("arguments should parse")
    }

    fn sandbox_args(args: Args) -> Vec<String> {
        match args.command {
            Commands::Sandbox(sandbox) => sandbox.command.to_args(),
            _ => panic!("expected a sandbox command"),
        }
    }

    fn conduct_args(args: Args) -> Vec<String> {
        match args.command {
            Commands::Conduct(conduct) => conduct.to_args(),
            _ => panic!("expected a conduct command"),
        }
    }

    fn position(argv: &[String], value: &str) -> usize {
        argv.iter()
            .position(|arg| arg == value)
            .unwrap_or_else(|| panic!("`{value}` missing from {argv:?}"))
    }

    #[test]
    fn sandbox_run_keeps_each_flag_once_per_occurrence() {
        let argv = sandbox_args(parse(&[
            "conductr",
            "sandbox",
            "run",
            "--image-version",
            "2.1.0",
            "--nr-of-containers",
            "3",
            "--conductr-role",
            "web",
            "--conductr-role",
            "backend",
            "--env",
            "A=1",
            "--env",
            "B=2",
            "--port",
            "9000",
            "--port",
            "9999",
            "--no-default-features",
        ]));

        assert_eq!(argv[0], "run");
        assert_eq!(argv.iter().filter(|arg| *arg == "--image-version").count(), 1);
        assert_eq!(argv.iter().filter(|arg| *arg == "--conductr-role").count(), 2);
        assert_eq!(argv.iter().filter(|arg| *arg == "--env").count(), 2);
        assert_eq!(argv.iter().filter(|arg| *arg == "--port").count(), 2);
        assert_eq!(
            argv.iter().filter(|arg| *arg == "--no-default-features").count(),
            1
        );
    }

    #[test]
    fn repeatable_flags_keep_their_relative_order() {
        let argv = sandbox_args(parse(&[
            "conductr",
            "sandbox",
            "run",
            "--env",
            "A=1",
            "--conductr-role",
            "web",
            "--env",
            "B=2",
            "--conductr-role",
            "backend",
            "--port",
            "9000",
            "--port",
            "9999",
        ]));

        assert!(position(&argv, "A=1") < position(&argv, "B=2"));
        assert!(position(&argv, "web") < position(&argv, "backend"));
        assert!(position(&argv, "9000") < position(&argv, "9999"));
    }

    #[test]
    fn env_without_equals_is_rejected() {
        for flag in ["--env", "--env-core", "--env-agent"] {
            let result = Args::try_parse_from(["conductr", "sandbox", "run", flag, "FOO"]);
            let error = result.expect_err("a value without `=` should not parse");
            assert!(error.to_string().contains("KEY=VALUE"));
        }
    }

    #[test]
    fn env_splits_on_the_first_equals() {
        let argv = sandbox_args(parse(&[
            "conductr",
            "sandbox",
            "run",
            "--env",
            "JAVA_OPTS=-Xmx=512m",
        ]));
        assert!(argv.contains(&"JAVA_OPTS=-Xmx=512m".to_string()));
    }

    #[test]
    fn numeric_flags_reject_non_numeric_values() {
        assert!(
            Args::try_parse_from(["conductr", "sandbox", "run", "--nr-of-containers", "two"])
                .is_err()
        );
        assert!(Args::try_parse_from(["conductr", "sandbox", "run", "--port", "p80"]).is_err());
        assert!(
            Args::try_parse_from(["conductr", "conduct", "info", "--api-version", "x"]).is_err()
        );
    }

    #[test]
    fn instance_counts_accept_core_and_agent_form() {
        let argv = sandbox_args(parse(&[
            "conductr",
            "sandbox",
            "run",
            "--nr-of-instances",
            "2:3",
        ]));
        let flag = position(&argv, "--nr-of-instances");
        assert_eq!(argv[flag + 1], "2:3");

        let argv = sandbox_args(parse(&[
            "conductr",
            "sandbox",
            "run",
            "--nr-of-instances",
            "2",
        ]));
        let flag = position(&argv, "--nr-of-instances");
        assert_eq!(argv[flag + 1], "2");

        let result =
            Args::try_parse_from(["conductr", "sandbox", "run", "--nr-of-instances", "2:x"]);
        let error = result.expect_err("a non-numeric agent count should not parse");
        assert!(error.to_string().contains("NR"));
    }

    #[test]
    fn feature_occurrences_keep_their_own_arguments() {
        let argv = sandbox_args(parse(&[
            "conductr",
            "sandbox",
            "run",
            "--feature",
            "visualization",
            "--feature",
            "logging",
            "v2",
            "--no-default-features",
        ]));

        assert_eq!(argv.iter().filter(|arg| *arg == "--feature").count(), 2);
        let first = position(&argv, "visualization");
        let second = position(&argv, "logging");
        assert!(first < second);
        assert_eq!(argv[second + 1], "v2");
        assert_eq!(argv[first - 1], "--feature");
        assert_eq!(argv[second - 1], "--feature");
    }

    #[test]
    fn conduct_load_takes_bundle_and_optional_configuration() {
        let argv = conduct_args(parse(&[
            "conductr",
            "conduct",
            "load",
            "web.zip",
            "web-config.zip",
            "--long-ids",
            "-q",
        ]));

        assert_eq!(argv[0], "load");
        assert_eq!(argv[1], "web.zip");
        assert_eq!(argv[2], "web-config.zip");
        assert!(argv.contains(&"-q".to_string()));
        assert!(argv.contains(&"--long-ids".to_string()));
    }

    #[test]
    fn conduct_run_keeps_scale_and_connection_options() {
        let argv = conduct_args(parse(&[
            "conductr",
            "conduct",
            "run",
            "web",
            "--scale",
            "2",
            "--affinity",
            "db",
            "--ip",
            "10.0.0.1",
            "--port",
            "9005",
            "--api-version",
            "2",
        ]));

        assert_eq!(argv[0], "run");
        assert_eq!(argv[1], "web");
        assert_eq!(argv[position(&argv, "--scale") + 1], "2");
        assert_eq!(argv[position(&argv, "--affinity") + 1], "db");
        assert_eq!(argv[position(&argv, "--ip") + 1], "10.0.0.1");
        assert_eq!(argv[position(&argv, "--port") + 1], "9005");
        assert_eq!(argv[position(&argv, "--api-version") + 1], "2");
    }

    #[test]
    fn conduct_subcommands_map_to_their_verbs() {
        for (tokens, verb) in [
            (vec!["conductr", "conduct", "info"], "info"),
            (vec!["conductr", "conduct", "service-names"], "service-names"),
            (vec!["conductr", "conduct", "members"], "members"),
            (vec!["conductr", "conduct", "agents"], "agents"),
            (vec!["conductr", "conduct", "load-license"], "load-license"),
            (vec!["conductr", "conduct", "version"], "version"),
        ] {
            let argv = conduct_args(parse(&tokens));
            assert_eq!(argv[0], verb);
        }

        let argv = conduct_args(parse(&["conductr", "conduct", "acls", "http"]));
        assert_eq!(argv, vec!["acls", "http"]);

        let argv = conduct_args(parse(&[
            "conductr", "conduct", "logs", "web", "-n", "25",
        ]));
        assert_eq!(argv, vec!["logs", "web", "--lines", "25"]);
    }

    #[test]
    fn unknown_subcommands_fall_back_to_help() {
        assert!(Args::try_parse_from(["conductr", "bogus"]).is_err());
        assert!(Args::try_parse_from(["conductr", "conduct", "bogus"]).is_err());
        assert!(Args::try_parse_from(["conductr", "sandbox", "bogus"]).is_err());
    }

    #[test]
    fn shell_variables_derive_from_entry_names() {
        assert_eq!(shell_variable("svc-a"), "SVC_A");
        assert_eq!(shell_variable("visualizer"), "VISUALIZER");
        assert_eq!(shell_variable("3d-graphics"), "_3D_GRAPHICS");
    }
}
