mod checks {
    mod files {
        use std::io::Write;

        use typed_arg_parse::{
            checks::{self, Comparison},
            Destination, ErrorKind, Handler, ParserError,
        };

        #[test]
        fn existing_file() {
            let file = tempfile::NamedTempFile::new().unwrap();
            let path = file.path().to_string_lossy().to_string();
            let mut input = String::new();
            {
                let mut handler = Handler::default();
                handler
                    .add_positional("input", Destination::scalar(&mut input), "")
                    .unwrap()
                    .add_check(checks::is_file())
                    .unwrap();
                handler.parse_args([path.as_str()]).unwrap();
            }
            assert_eq!(input, path);
        }

        #[test]
        fn directory_is_not_a_file() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().to_string_lossy().to_string();
            let mut input = String::new();
            let mut handler = Handler::default();
            handler
                .add_argument("i,input", Destination::scalar(&mut input), "")
                .unwrap()
                .add_check(checks::is_file())
                .unwrap();
            let report = handler.parse_args(["-i", path.as_str()]).unwrap_err();
            assert_eq!(
                report.first().map(|x| x.error.clone()),
                Some(ParserError::CheckFailed(
                    "--input".to_string(),
                    path.clone(),
                    format!("\"{}\" is not an existing file", path)
                ))
            );
        }

        #[test]
        fn output_in_existing_directory() {
            let dir = tempfile::tempdir().unwrap();
            let good = dir.path().join("out.txt").to_string_lossy().to_string();
            let bad = dir
                .path()
                .join("missing")
                .join("out.txt")
                .to_string_lossy()
                .to_string();

            let parse = |value: &str| {
                let mut output = String::new();
                let mut handler = Handler::default();
                handler
                    .add_argument("output", Destination::scalar(&mut output), "")
                    .unwrap()
                    .add_check(checks::parent_directory_exists())
                    .unwrap()
                    .add_check(checks::absolute_path())
                    .unwrap();
                handler.parse_args(["--output", value])
            };
            assert!(parse(&good).is_ok());
            assert_eq!(
                parse(&bad).unwrap_err().kinds(),
                vec![ErrorKind::CheckFailed]
            );
            assert_eq!(
                parse("out.txt").unwrap_err().kinds(),
                vec![ErrorKind::CheckFailed]
            );
        }

        #[test]
        fn file_size() {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            file.write_all(b"0123456789").unwrap();
            file.flush().unwrap();
            let path = file.path().to_string_lossy().to_string();

            let parse = |comparison: Comparison, bytes: u64| {
                let mut input = String::new();
                let mut handler = Handler::default();
                handler
                    .add_argument("input", Destination::scalar(&mut input), "")
                    .unwrap()
                    .add_check(checks::file_size(comparison, bytes))
                    .unwrap();
                handler.parse_args(["--input", path.as_str()])
            };
            assert!(parse(Comparison::Equal, 10).is_ok());
            assert!(parse(Comparison::Less, 100).is_ok());
            assert!(parse(Comparison::Greater, 10).is_err());
        }
    }

    mod values {
        use typed_arg_parse::{checks, formatter, Destination, ErrorKind, Handler};

        #[test]
        fn choices_after_formatting() {
            let mut mode = String::new();
            {
                let mut handler = Handler::default();
                handler
                    .add_argument("mode", Destination::scalar(&mut mode), "")
                    .unwrap()
                    .add_formatter(formatter::lowercase())
                    .unwrap()
                    .add_check(checks::values(&["fast", "slow"]).unwrap())
                    .unwrap();
                handler.parse_args(["--mode", "FAST"]).unwrap();
            }
            assert_eq!(mode, "fast");
        }

        #[test]
        fn pattern() {
            let mut version = String::new();
            let mut handler = Handler::default();
            handler
                .add_argument("version", Destination::scalar(&mut version), "")
                .unwrap()
                .add_check(checks::pattern(r"^\d+\.\d+$").unwrap())
                .unwrap();
            assert_eq!(
                handler.parse_args(["--version", "1.x"]).unwrap_err().kinds(),
                vec![ErrorKind::CheckFailed]
            );
        }

        #[test]
        fn formatters_listed_in_usage() {
            let mut words: Vec<String> = Vec::new();
            let mut handler = Handler::default();
            handler
                .add_argument("w", Destination::sequence(&mut words), "")
                .unwrap()
                .add_formatter(formatter::trim())
                .unwrap()
                .add_position_formatter(0, formatter::uppercase())
                .unwrap()
                .add_check(checks::min_length(2))
                .unwrap();
            assert_eq!(
                handler.usage(),
                "arguments:\n- -w <string> (values: any number, formatted: trim, uppercase (value 0), length >= 2)\n"
            );
        }

        #[test]
        fn checks_listed_in_usage() {
            let mut level = 0u8;
            let mut handler = Handler::default();
            handler
                .add_argument("l,level", Destination::scalar(&mut level), "log level")
                .unwrap()
                .add_check(checks::upper(5u8))
                .unwrap();
            assert_eq!(
                handler.usage(),
                "arguments:\n- -l,--level <u8>: log level (value <= 5)\n"
            );
        }
    }
}
