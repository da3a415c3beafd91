use colored::*;
use rand::seq::IndexedRandom;

use crate::terminal::print;

const CAT_0: &str = r#"
                      /\_/\      _
                     ( o.o )    //
                      > ^ <    //
                     /     \  //
                    (|     |)//
                     \_____/
"#;

const CAT_1: &str = r#"
                       |\__/,|   (`\
                     _.|o o  |_   ) )
                   -(((---(((--------
"#;

const CAT_2: &str = r#"
                        /\_____/\
                       /  o   o  \
                      ( ==  ^  == )
                       )         (
                      (           )
                     ( (  )   (  ) )
                    (__(__)___(__)__)
"#;

const BANNERS: &[&str] = &[CAT_0, CAT_1, CAT_2];

pub fn print() {
    let art = BANNERS.choose(&mut rand::rng()).copied().unwrap_or(CAT_0);
    print::print(&format!("{}", art.bright_cyan()));
    print::centerln(&format!("{}", "sniffing out model endpoints".italic().bright_black()));
}
