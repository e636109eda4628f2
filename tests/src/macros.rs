/// Asserts that two collections hold the same items with the same
/// multiplicity, in any order.
#[macro_export]
macro_rules! assert_eq_unordered {
    ($actual:expr, $expect:expr $(,)?) => {{
        let mut actual: Vec<_> = $actual.into_iter().collect();
        let mut expect: Vec<_> = $expect.into_iter().collect();
        actual.sort();
        expect.sort();
        assert_eq!(actual, expect);
    }};
}

/// Instantiates each listed test once per enabled backend feature.
#[macro_export]
macro_rules! tests {
    (@backend $feature:literal, $db:ident, $setup:ident; $( $( #[$attrs:meta] )* $f:ident ),+) => {
        #[cfg(feature = $feature)]
        mod $db {
            $(
                #[test]
                $( #[$attrs] )*
                fn $f() {
                    let mut test = $crate::DbTest::new(Box::new($crate::db::$db::$setup::new()));

                    test.run_test(move |test| Box::pin(async move {
                        super::$f(test).await;
                    }));
                }
            )*
        }
    };
    ( $( $( #[$attrs:meta] )* $f:ident ),+ $(,)? ) => {
        $crate::tests!(@backend "sqlite", sqlite, SetupSqlite; $( $( #[$attrs] )* $f ),+);
        $crate::tests!(@backend "mysql", mysql, SetupMySQL; $( $( #[$attrs] )* $f ),+);
        $crate::tests!(@backend "postgresql", postgresql, SetupPostgreSQL; $( $( #[$attrs] )* $f ),+);
    };
}
