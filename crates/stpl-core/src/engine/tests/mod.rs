mod helpers;

mod include;
