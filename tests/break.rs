#[macro_use]
mod common;

#[cfg(test)]
mod _break {
    tests! {
        inside_while is OK
        r#"
        let i = 0;
        while (i < 5) {
            if (i == 3) break;
            print(i);
            i = i + 1;
        }
        "#,
        "0",
        "1",
        "2"
    }

    tests! {
        inside_for is OK
        r#"
        for (let i = 0; i < 5; i = i + 1) {
            if (i == 3) break;
            print(i);
        }
        "#,
        "0",
        "1",
        "2"
    }

    tests! {
        only_breaks_innermost_loop is OK
        r#"
        for (let i = 0; i < 2; i = i + 1) {
            print("outer");
            while (true) {
                print("inner");
                break;
            }
        }
        "#,
        "outer",
        "inner",
        "outer",
        "inner"
    }

    tests! {
        passes_through_if_and_block is OK
        r#"
        while (true) {
            {
                if (true) {
                    break;
                }
            }
        }
        print("done");
        "#,
        "done"
    }

    tests! {
        no_loop is ERR
        "break;",
        "[line 1:1] Error at 'break': Cannot use 'break' outside of a loop"
    }
}
