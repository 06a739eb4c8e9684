#[macro_use]
mod common;

#[cfg(test)]
mod _continue {
    tests! {
        inside_while is OK
        r#"
        let i = 0;
        while (i < 5) {
            i = i + 1;
            if (i == 3) continue;
            print(i);
        }
        "#,
        "1",
        "2",
        "4",
        "5"
    }

    tests! {
        inside_for is OK
        r#"
        for (let i = 0; i < 5; i = i + 1) {
            if (i == 2) continue;
            print(i);
        }
        "#,
        "0",
        "1",
        "3",
        "4"
    }

    tests! {
        only_continues_innermost_loop is OK
        r#"
        for (let i = 0; i < 2; i = i + 1) {
            print("outer");
            for (let j = 0; j < 2; j = j + 1) {
                if (j == 0) continue;
                print("inner");
            }
        }
        "#,
        "outer",
        "inner",
        "outer",
        "inner"
    }

    tests! {
        runs_for_increment_before_retesting_condition is OK
        r#"
        for (let i = 0; i < 3; i = i + 1) {
            continue;
        }
        print("done");
        "#,
        "done"
    }

    tests! {
        no_loop is ERR
        "continue;",
        "[line 1:1] Error at 'continue': Cannot use 'continue' outside of a loop"
    }
}
