//! Engine scenario tests

mod mint_burn;
