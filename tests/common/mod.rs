/// Runs inline source text through the interpreter and checks its output,
/// or (for the ERR arm) runs it through the built binary and checks its
/// diagnostics and exit status.
#[macro_export]
macro_rules! tests {
    ($name:ident is OK $source:expr, $($expected:expr),* $(,)?) => {
        #[test]
        fn $name() {
            use std::cell::RefCell;
            use std::io::Write;
            use std::rc::Rc;

            use rocks_lang::{error, rocks};

            error::reset_error();

            let mut expected: Vec<&str> = vec![$($expected),*];
            let expected = if expected.is_empty() {
                String::new()
            } else {
                expected.push("");
                expected.join("\n")
            };

            let buffer = Rc::new(RefCell::new(Vec::<u8>::new()));
            let output: Rc<RefCell<dyn Write>> = buffer.clone();
            let mut rocks = rocks::with_output(output);

            rocks.run($source);

            let actual = String::from_utf8(buffer.borrow().clone()).unwrap();
            assert_eq!(expected, actual);
        }
    };

    ($name:ident is ERR $source:expr, $($expected:expr),+ $(,)?) => {
        #[test]
        fn $name() {
            use assert_cmd::Command;

            let expected = vec![$($expected),+].join("\n");

            let mut path = std::env::temp_dir();
            path.push(format!("rocks_test_{}_{}.rocks", stringify!($name), std::process::id()));
            std::fs::write(&path, $source).expect("write temporary source file");

            Command::cargo_bin("rocks").unwrap()
                .arg(&path)
                .assert()
                .stderr(format!("{expected}\n"))
                .failure();

            let _ = std::fs::remove_file(&path);
        }
    };
}
