#[macro_use]
mod common;

#[cfg(test)]
mod constructor {
    tests! {
        arguments is OK
        r#"
        class Foo {
            init(a, b) {
                print("init");
                this.a = a;
                this.b = b;
            }
        }
        let foo = Foo(1, 2);
        print(foo.a);
        print(foo.b);
        "#,
        "init",
        "1",
        "2"
    }

    tests! {
        call_init_early_return is OK
        r#"
        class Foo {
            init() {
                print("init");
                return;
                print("nope");
            }
        }
        let foo = Foo();
        print(foo.init());
        "#,
        "init",
        "init",
        "<instance Foo>"
    }

    tests! {
        call_init_explicitly is OK
        r#"
        class Foo {
            init(arg) {
                print("Foo.init(" + arg + ")");
                this.field = "init";
            }
        }
        let foo = Foo("one");
        foo.field = "field";
        let foo2 = foo.init("two");
        print(foo2);
        print(foo.field);
        "#,
        "Foo.init(one)",
        "Foo.init(two)",
        "<instance Foo>",
        "init"
    }

    tests! {
        default is OK
        r#"
        class Foo {}
        let foo = Foo();
        print(foo);
        "#,
        "<instance Foo>"
    }

    tests! {
        default_arguments is ERR
        r#"
        class Foo {}
        let foo = Foo(1, 2, 3);
        "#,
        "[line 3:30] Error at ')': Expected 0 arguments but got 3"
    }

    tests! {
        early_return is OK
        r#"
        class Foo {
            init() {
                print("init");
                return;
            }
        }
        let foo = Foo();
        print(foo);
        "#,
        "init",
        "<instance Foo>"
    }

    tests! {
        extra_arguments is ERR
        r#"
        class Foo {
            init(a, b) {
                this.a = a;
                this.b = b;
            }
        }
        let foo = Foo(1, 2, 3, 4);
        "#,
        "[line 3:22] Error at ')': Expected 2 arguments but got 4"
    }

    tests! {
        init_not_method is OK
        r#"
        class Foo {
            init(arg) {
                print("Foo.init(" + arg + ")");
                this.field = "init";
            }
        }
        fun init() {
            print("not initializer");
        }
        init();
        "#,
        "not initializer"
    }

    tests! {
        missing_arguments is ERR
        r#"
        class Foo {
            init(a, b) {}
        }
        let foo = Foo(1);
        "#,
        "[line 3:22] Error at ')': Expected 2 arguments but got 1"
    }

    tests! {
        return_in_nested_function is OK
        r#"
        class Foo {
            init() {
                fun init() {
                    return "bar";
                }
                print(init());
            }
        }
        print(Foo());
        "#,
        "bar",
        "<instance Foo>"
    }

    tests! {
        return_value is ERR
        r#"
        class Foo {
            init() {
                return "result";
            }
        }
        "#,
        "[line 4:17] Error at 'return': Cannot return a value from an initializer"
    }
}
