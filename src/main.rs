fn main()
{
        std::process::exit(paintbox::run());
}
