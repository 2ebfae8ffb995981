mod parsing {
    mod scenario {
        use typed_arg_parse::{checks, Cardinality, Destination, ErrorKind, Handler, ParseReport};

        fn parse(tokens: &[&str]) -> (Result<(), ParseReport>, Vec<i32>) {
            let mut values: Vec<i32> = Vec::new();
            let result = {
                let mut handler = Handler::default();
                handler
                    .add_argument("--x", Destination::sequence(&mut values), "")
                    .unwrap()
                    .with_cardinality(Cardinality::range(1, 3))
                    .unwrap()
                    .add_check(checks::range(10, 20).unwrap())
                    .unwrap();
                handler.parse_args(tokens)
            };
            (result, values)
        }

        #[test]
        fn values_in_range() {
            let (result, values) = parse(&["--x", "15", "--x", "12"]);
            assert!(result.is_ok());
            assert_eq!(values, vec![15, 12]);
        }

        #[test]
        fn value_out_of_range() {
            let (result, values) = parse(&["--x", "25"]);
            assert_eq!(result.unwrap_err().kinds(), vec![ErrorKind::CheckFailed]);
            assert!(values.is_empty());
        }

        #[test]
        fn too_many_values() {
            let (result, values) = parse(&["--x", "10", "--x", "11", "--x", "12", "--x", "13"]);
            assert_eq!(result.unwrap_err().kinds(), vec![ErrorKind::TooManyValues]);
            assert_eq!(values, vec![10, 11, 12]);
        }

        #[test]
        fn non_numeric_value_fails_check() {
            let (result, _) = parse(&["--x", "ten"]);
            assert_eq!(result.unwrap_err().kinds(), vec![ErrorKind::CheckFailed]);
        }
    }

    mod flags {
        use typed_arg_parse::{Destination, ErrorKind, Handler, ParserError, ValueMode};

        #[test]
        fn combined_short_flags() {
            let (mut a, mut b, mut c) = (false, false, 0);
            {
                let mut handler = Handler::default();
                handler.add_argument("a", Destination::flag(&mut a), "").unwrap();
                handler.add_argument("b", Destination::flag(&mut b), "").unwrap();
                handler.add_argument("c", Destination::counter(&mut c), "").unwrap();
                handler.parse_args(["-acb", "-cc"]).unwrap();
            }
            assert!(a && b);
            assert_eq!(c, 3);
        }

        #[test]
        fn combined_short_disabled() {
            let (mut a, mut b) = (false, false);
            let settings = typed_arg_parse::HandlerSettings::builder()
                .with_allow_combined_short(false)
                .build()
                .unwrap();
            let mut handler = Handler::new(settings);
            handler.add_argument("a", Destination::flag(&mut a), "").unwrap();
            handler.add_argument("b", Destination::flag(&mut b), "").unwrap();
            assert_eq!(
                handler.parse_args(["-ab"]).unwrap_err().kinds(),
                vec![ErrorKind::UnknownArgument]
            );
        }

        #[test]
        fn inversion() {
            let mut color = true;
            {
                let mut handler = Handler::default();
                handler
                    .add_argument("color", Destination::flag(&mut color), "")
                    .unwrap()
                    .with_inversion()
                    .unwrap();
                handler.parse_args(["!--color"]).unwrap();
            }
            assert!(!color);
        }

        #[test]
        fn inversion_not_allowed() {
            let mut color = false;
            let mut handler = Handler::default();
            handler
                .add_argument("color", Destination::flag(&mut color), "")
                .unwrap();
            assert_eq!(
                handler
                    .parse_args(["!--color"])
                    .unwrap_err()
                    .first()
                    .map(|x| x.error.clone()),
                Some(ParserError::InversionNotSupported("--color".to_string()))
            );
        }

        #[test]
        fn flag_given_twice() {
            let mut a = false;
            let mut handler = Handler::default();
            handler.add_argument("a", Destination::flag(&mut a), "").unwrap();
            assert_eq!(
                handler.parse_args(["-a", "-a"]).unwrap_err().kinds(),
                vec![ErrorKind::TooManyValues]
            );
        }

        #[test]
        fn value_for_value_less_argument() {
            let mut level = 0;
            let mut handler = Handler::default();
            handler
                .add_argument("level", Destination::counter(&mut level), "")
                .unwrap();
            assert_eq!(
                handler.parse_args(["--level=3"]).unwrap_err().kinds(),
                vec![ErrorKind::ConversionFailed]
            );
        }

        #[test]
        fn optional_flag_value() {
            let (mut a, mut b) = (false, true);
            {
                let mut handler = Handler::default();
                handler
                    .add_argument("a", Destination::flag(&mut a), "")
                    .unwrap()
                    .with_value_mode(ValueMode::Optional)
                    .unwrap();
                handler
                    .add_argument("b", Destination::flag(&mut b), "")
                    .unwrap()
                    .with_value_mode(ValueMode::Optional)
                    .unwrap();
                handler.parse_args(["-a", "-b", "false"]).unwrap();
            }
            assert!(a);
            assert!(!b);
        }
    }

    mod values {
        use std::collections::BTreeMap;

        use typed_arg_parse::{Destination, ErrorKind, Handler, ValueMode};

        #[test]
        fn inline_and_attached_values() {
            let (mut name, mut out) = (String::new(), String::new());
            {
                let mut handler = Handler::default();
                handler
                    .add_argument("name", Destination::scalar(&mut name), "")
                    .unwrap();
                handler
                    .add_argument("o", Destination::scalar(&mut out), "")
                    .unwrap();
                handler.parse_args(["--name=a=b", "-ofile.txt"]).unwrap();
            }
            assert_eq!(name, "a=b");
            assert_eq!(out, "file.txt");
        }

        #[test]
        fn required_value_may_look_like_key() {
            let mut offset = 0;
            {
                let mut handler = Handler::default();
                handler
                    .add_argument("offset", Destination::scalar(&mut offset), "")
                    .unwrap();
                handler.parse_args(["--offset", "-5"]).unwrap();
            }
            assert_eq!(offset, -5);
        }

        #[test]
        fn missing_value() {
            let mut offset = 0;
            let mut handler = Handler::default();
            handler
                .add_argument("offset", Destination::scalar(&mut offset), "")
                .unwrap();
            assert_eq!(
                handler.parse_args(["--offset"]).unwrap_err().kinds(),
                vec![ErrorKind::IncompleteValues]
            );
        }

        #[test]
        fn optional_value_uses_implicit_value() {
            let (mut level, mut verbose) = (0, false);
            {
                let mut handler = Handler::default();
                handler
                    .add_argument("level", Destination::scalar(&mut level), "")
                    .unwrap()
                    .with_value_mode(ValueMode::Optional)
                    .unwrap()
                    .with_implicit_value(2)
                    .unwrap();
                handler
                    .add_argument("v", Destination::flag(&mut verbose), "")
                    .unwrap();
                handler.parse_args(["--level", "-v"]).unwrap();
            }
            assert_eq!(level, 2);
            assert!(verbose);
        }

        #[test]
        fn list_separator_counts_each_value() {
            let mut values: Vec<u16> = Vec::new();
            let mut handler = Handler::default();
            handler
                .add_argument("p,ports", Destination::sequence(&mut values), "")
                .unwrap()
                .with_list_separator(',')
                .unwrap()
                .with_cardinality(typed_arg_parse::Cardinality::max(2))
                .unwrap();
            assert_eq!(
                handler.parse_args(["-p", "80,443,8080"]).unwrap_err().kinds(),
                vec![ErrorKind::TooManyValues]
            );
        }

        #[test]
        fn multiple_values() {
            let mut values: Vec<String> = Vec::new();
            let mut flag = false;
            {
                let mut handler = Handler::default();
                handler
                    .add_argument("files", Destination::sequence(&mut values), "")
                    .unwrap()
                    .with_multiple_values()
                    .unwrap();
                handler.add_argument("f", Destination::flag(&mut flag), "").unwrap();
                handler
                    .parse_args(["--files", "a", "b", "c", "-f"])
                    .unwrap();
            }
            assert_eq!(values, vec!["a", "b", "c"]);
            assert!(flag);
        }

        #[test]
        fn key_values() {
            let mut defines: BTreeMap<String, i32> = BTreeMap::new();
            {
                let mut handler = Handler::default();
                handler
                    .add_argument("D", Destination::map(&mut defines), "")
                    .unwrap();
                handler.parse_args(["-D", "a=1", "-Db=2"]).unwrap();
            }
            assert_eq!(defines.get("a"), Some(&1));
            assert_eq!(defines.get("b"), Some(&2));
        }

        #[test]
        fn key_value_without_separator() {
            let mut defines: BTreeMap<String, i32> = BTreeMap::new();
            let mut handler = Handler::default();
            handler
                .add_argument("D", Destination::map(&mut defines), "")
                .unwrap();
            assert_eq!(
                handler.parse_args(["-D", "a"]).unwrap_err().kinds(),
                vec![ErrorKind::ConversionFailed]
            );
        }

        #[test]
        fn passthrough() {
            let mut command: Vec<String> = Vec::new();
            let mut verbose = false;
            {
                let mut handler = Handler::default();
                handler.add_argument("v", Destination::flag(&mut verbose), "").unwrap();
                handler
                    .add_argument("exec", Destination::sequence(&mut command), "")
                    .unwrap()
                    .with_value_mode(ValueMode::Passthrough)
                    .unwrap()
                    .with_cardinality(typed_arg_parse::Cardinality::max(1))
                    .unwrap();
                handler
                    .parse_args(["--exec", "ls", "-v", "--all"])
                    .unwrap();
            }
            assert_eq!(command, vec!["ls", "-v", "--all"]);
            assert!(!verbose);
        }
    }

    mod positionals {
        use typed_arg_parse::{Destination, ErrorKind, Handler, ParserError};

        #[test]
        fn fill_in_order() {
            let mut source = String::new();
            let mut targets: Vec<String> = Vec::new();
            let mut force = false;
            {
                let mut handler = Handler::default();
                handler
                    .add_positional("source", Destination::scalar(&mut source), "")
                    .unwrap();
                handler
                    .add_positional("targets", Destination::sequence(&mut targets), "")
                    .unwrap();
                handler.add_argument("f", Destination::flag(&mut force), "").unwrap();
                handler.parse_args(["a", "b", "-f", "c"]).unwrap();
            }
            assert_eq!(source, "a");
            assert_eq!(targets, vec!["b", "c"]);
            assert!(force);
        }

        #[test]
        fn missing_positional() {
            let mut source = String::new();
            let mut handler = Handler::default();
            handler
                .add_positional("source", Destination::scalar(&mut source), "")
                .unwrap();
            assert_eq!(
                handler
                    .parse_args(Vec::<&str>::new())
                    .unwrap_err()
                    .first()
                    .map(|x| x.error.clone()),
                Some(ParserError::MissingRequiredArgument("source".to_string()))
            );
        }

        #[test]
        fn optional_positional() {
            let mut source = String::new();
            let mut handler = Handler::default();
            handler
                .add_positional("source", Destination::scalar(&mut source), "")
                .unwrap()
                .with_optional();
            handler.parse_args(Vec::<&str>::new()).unwrap();
        }

        #[test]
        fn extra_value() {
            let mut source = String::new();
            let mut handler = Handler::default();
            handler
                .add_positional("source", Destination::scalar(&mut source), "")
                .unwrap();
            let report = handler.parse_args(["a", "b"]).unwrap_err();
            assert_eq!(report.kinds(), vec![ErrorKind::UnknownArgument]);
            assert_eq!(
                report.first().map(|x| x.error.clone()),
                Some(ParserError::UnknownArgument("b".to_string()))
            );
        }

        #[test]
        fn end_of_options() {
            let mut values: Vec<String> = Vec::new();
            let mut verbose = false;
            {
                let mut handler = Handler::default();
                handler
                    .add_argument("v", Destination::flag(&mut verbose), "")
                    .unwrap();
                handler
                    .add_positional("rest", Destination::sequence(&mut values), "")
                    .unwrap();
                handler.parse_args(["x", "--", "-v", "--y"]).unwrap();
            }
            assert_eq!(values, vec!["x", "-v", "--y"]);
            assert!(!verbose);
        }

        #[test]
        fn negative_number_as_positional() {
            let mut number = 0.0f64;
            {
                let mut handler = Handler::default();
                handler
                    .add_positional("number", Destination::scalar(&mut number), "")
                    .unwrap();
                handler.parse_args(["-2.5"]).unwrap();
            }
            assert_eq!(number, -2.5);
        }
    }

    mod unknown {
        use typed_arg_parse::{Destination, Handler, ParserError};

        #[test]
        fn unknown_key() {
            let mut a = false;
            let mut handler = Handler::default();
            handler.add_argument("a", Destination::flag(&mut a), "").unwrap();
            let report = handler.parse_args(["--b"]).unwrap_err();
            assert_eq!(
                report.first().map(|x| x.error.clone()),
                Some(ParserError::UnknownArgument("--b".to_string()))
            );
            assert_eq!(report.first().and_then(|x| x.key.clone()), None);
        }

        #[test]
        fn deprecated_argument() {
            let mut a = false;
            let mut handler = Handler::default();
            handler
                .add_argument("a,old", Destination::flag(&mut a), "")
                .unwrap()
                .with_replaced_by("--new")
                .unwrap();
            assert_eq!(
                handler.parse_args(["-a"]).unwrap_err().to_string(),
                "-a,--old: argument --old is deprecated, use --new instead"
            );
        }
    }
}
