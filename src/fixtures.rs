#[cfg(test)]
pub mod test {
    use serde::{Deserialize, Serialize};

    use crate::schema::{Field, Schema, Settings};

    #[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
    pub struct TestStruct {
        pub int: i32,
        pub bool: bool,
        pub string: String,
        pub dstring: String,
        pub sub: TestSubStruct,
    }

    #[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
    pub struct TestSubStruct {
        pub int: i32,
        pub bool: bool,
        pub string: String,
        pub dstring: String,
        pub sub_sub: TestSubSubStruct,
    }

    #[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
    pub struct TestSubSubStruct {
        pub rint: i32,
        pub dint: i32,
    }

    impl Settings for TestStruct {
        fn schema() -> Schema {
            Schema::new()
                .field(Field::new::<i32>("int"))
                .field(Field::new::<bool>("bool"))
                .field(Field::new::<String>("string").required())
                .field(Field::new::<String>("dstring").default("string"))
                .field(Field::nested::<TestSubStruct>("sub"))
        }
    }

    impl Settings for TestSubStruct {
        fn schema() -> Schema {
            Schema::new()
                .field(Field::new::<i32>("int"))
                .field(Field::new::<bool>("bool"))
                .field(Field::new::<String>("string").required())
                .field(Field::new::<String>("dstring").default("substring"))
                .field(Field::nested::<TestSubSubStruct>("sub_sub"))
        }
    }

    impl Settings for TestSubSubStruct {
        fn schema() -> Schema {
            Schema::new()
                .field(Field::new::<i32>("rint").required())
                .field(Field::new::<i32>("dint").default("1"))
        }
    }

    /// Fill the values every passing scenario ends up with unless the
    /// scenario overrides them.
    pub fn with_strings(mut s: TestStruct) -> TestStruct {
        if s.dstring.is_empty() {
            s.dstring = "string".into();
        }
        if s.string.is_empty() {
            s.string = "string".into();
        }
        if s.sub.string.is_empty() {
            s.sub.string = "substring".into();
        }
        if s.sub.dstring.is_empty() {
            s.sub.dstring = "substring".into();
        }
        if s.sub.sub_sub.rint == 0 {
            s.sub.sub_sub.rint = 2;
        }
        if s.sub.sub_sub.dint == 0 {
            s.sub.sub_sub.dint = 1;
        }
        s
    }

    /// Append the flags that satisfy every required field, unless present.
    pub fn with_required_flags(args: &[&str]) -> Vec<String> {
        let mut out: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        for (flag, value) in [
            ("--string", "string"),
            ("--sub-string", "substring"),
            ("--sub-sub-sub-rint", "2"),
        ] {
            if !args.contains(&flag) {
                out.push(flag.into());
                out.push(value.into());
            }
        }
        out
    }

    #[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
    pub struct TestStruct2 {
        pub float: f64,
        pub floatr: f64,
        pub floatd: f32,
        pub slice: Vec<String>,
        pub slicer: Vec<String>,
        pub sliced: Vec<String>,
    }

    impl Settings for TestStruct2 {
        fn schema() -> Schema {
            Schema::new()
                .field(Field::new::<f64>("float"))
                .field(Field::new::<f64>("floatr").required())
                .field(Field::new::<f32>("floatd").default("2.0"))
                .field(Field::new::<Vec<String>>("slice"))
                .field(Field::new::<Vec<String>>("slicer").required())
                .field(Field::new::<Vec<String>>("sliced").default("7,8,9"))
        }
    }

    /// Two plain booleans, for argv-only scenarios.
    #[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
    pub struct Toggles {
        pub test: bool,
        pub test2: bool,
    }

    impl Settings for Toggles {
        fn schema() -> Schema {
            Schema::new()
                .field(Field::new::<bool>("test"))
                .field(Field::new::<bool>("test2"))
        }
    }
}
