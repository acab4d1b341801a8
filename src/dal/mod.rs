pub mod game_list;
pub mod result_table;
