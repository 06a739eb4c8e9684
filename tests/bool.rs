#[macro_use]
mod common;

#[cfg(test)]
mod bool {
    tests! {
        equality is OK
        r#"
        print(true == true);
        print(true == false);
        print(false == true);
        print(false == false);
        print(true == 1);
        print(false == 0);
        print(true == "true");
        print(nil == false);
        "#,
        "true",
        "false",
        "false",
        "true",
        "false",
        "false",
        "false",
        "false"
    }

    tests! {
        not is OK
        r#"
        print(!true);
        print(!false);
        print(!!true);
        "#,
        "false",
        "true",
        "true"
    }

    tests! {
        not_a_number is OK
        "print(!0);",
        "false"
    }
}
