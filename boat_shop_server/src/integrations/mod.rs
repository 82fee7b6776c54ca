pub mod yookassa;
